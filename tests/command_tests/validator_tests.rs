//! Tests for the Command Validator
//!
//! These tests verify:
//! - Brightness clamping
//! - RGB / color temperature / HSV ranges
//! - Fade effect parsing
//! - Per-method parameter layouts

use serde_json::{json, Value};

use lightwire::command::{clamp_brightness, validate};
use lightwire::{ColorSpace, ColorSpec, Command, CommandKind, ErrorKind, FadeEffect, Power, Property};

// =============================================================================
// Helper Functions
// =============================================================================

fn params_of(kind: CommandKind, params: Vec<Value>) -> Vec<Value> {
    validate(kind, &params).unwrap().to_params()
}

fn rejected(kind: CommandKind, params: Vec<Value>) -> bool {
    match validate(kind, &params) {
        Ok(_) => false,
        Err(e) => {
            assert_eq!(e.kind(), ErrorKind::Validation, "unexpected error: {}", e);
            true
        }
    }
}

// =============================================================================
// Brightness Tests
// =============================================================================

#[test]
fn test_clamp_brightness() {
    for b in [-1000i64, -1, 0, 1, 50, 99, 100, 101, 150, i64::MAX] {
        assert_eq!(clamp_brightness(b) as i64, b.clamp(0, 100));
    }
}

#[test]
fn test_set_bright_clamps_instead_of_rejecting() {
    assert_eq!(params_of(CommandKind::SetBright, vec![json!(150)]), vec![json!(100), json!("smooth"), json!(300)]);
    assert_eq!(params_of(CommandKind::SetBright, vec![json!(-20)])[0], json!(0));
}

#[test]
fn test_set_bright_requires_integer() {
    assert!(rejected(CommandKind::SetBright, vec![json!("50")]));
    assert!(rejected(CommandKind::SetBright, vec![json!(50.5)]));
    assert!(rejected(CommandKind::SetBright, vec![]));
}

// =============================================================================
// Color Range Tests
// =============================================================================

#[test]
fn test_rgb_range() {
    assert!(ColorSpec::rgb(0).is_ok());
    assert!(ColorSpec::rgb(16_777_215).is_ok());
    assert!(ColorSpec::rgb(16_777_216).unwrap_err().is_validation());
    assert!(ColorSpec::rgb(-1).unwrap_err().is_validation());
}

#[test]
fn test_ct_range() {
    assert!(ColorSpec::ct(1700).is_ok());
    assert!(ColorSpec::ct(6500).is_ok());
    assert!(ColorSpec::ct(1699).is_err());
    assert!(ColorSpec::ct(6501).is_err());
}

#[test]
fn test_hsv_range_and_default_saturation() {
    assert_eq!(ColorSpec::hsv(0, None).unwrap(), ColorSpec::Hsv { hue: 0, sat: 50 });
    assert_eq!(ColorSpec::hsv(359, Some(100)).unwrap(), ColorSpec::Hsv { hue: 359, sat: 100 });
    assert!(ColorSpec::hsv(360, None).is_err());
    assert!(ColorSpec::hsv(-1, None).is_err());
}

#[test]
fn test_hsv_saturation_is_clamped() {
    assert_eq!(ColorSpec::hsv(10, Some(250)).unwrap(), ColorSpec::Hsv { hue: 10, sat: 100 });
    assert_eq!(ColorSpec::hsv(10, Some(-5)).unwrap(), ColorSpec::Hsv { hue: 10, sat: 0 });
}

#[test]
fn test_color_variants_are_revalidated() {
    let err = Command::set_color(ColorSpec::Ct(100), FadeEffect::default()).unwrap_err();
    assert!(err.is_validation());

    let err = Command::set_color(ColorSpec::Rgb(0x1_000_000), FadeEffect::default()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_color_space_parse() {
    assert_eq!("rgb".parse::<ColorSpace>().unwrap(), ColorSpace::Rgb);
    assert_eq!("hsv".parse::<ColorSpace>().unwrap(), ColorSpace::Hsv);
    assert!("cmyk".parse::<ColorSpace>().unwrap_err().is_validation());
    assert_eq!(ColorSpec::ct(3000).unwrap().space(), ColorSpace::Ct);
}

// =============================================================================
// Fade Effect Tests
// =============================================================================

#[test]
fn test_effect_defaults_to_smooth_300() {
    assert_eq!(FadeEffect::parse(None, None).unwrap(), FadeEffect::Smooth { duration_ms: 300 });
    assert_eq!(FadeEffect::default().duration_ms(), 300);
}

#[test]
fn test_effect_duration_bounds() {
    assert!(FadeEffect::smooth(30).is_ok());
    assert!(FadeEffect::smooth(3000).is_ok());
    assert!(FadeEffect::smooth(29).is_err());
    assert!(FadeEffect::smooth(3001).is_err());
}

#[test]
fn test_sudden_ignores_delay() {
    let effect = FadeEffect::parse(Some("sudden"), Some(5000)).unwrap();
    assert_eq!(effect, FadeEffect::Sudden);
    assert_eq!(effect.duration_ms(), 0);
}

#[test]
fn test_unknown_effect_rejected() {
    assert!(FadeEffect::parse(Some("instant"), None).unwrap_err().is_validation());
    assert!(rejected(CommandKind::SetRgb, vec![json!(255), json!("instant")]));
}

#[test]
fn test_invalid_smooth_effect_struct_rejected() {
    let err = Command::set_bright(10, FadeEffect::Smooth { duration_ms: 5 }).unwrap_err();
    assert!(err.is_validation());
}

// =============================================================================
// Method Layout Tests
// =============================================================================

#[test]
fn test_set_rgb_layout() {
    assert_eq!(
        params_of(CommandKind::SetRgb, vec![json!(0xFF0000), json!("smooth"), json!(500)]),
        vec![json!(16711680), json!("smooth"), json!(500)]
    );
    assert!(rejected(CommandKind::SetRgb, vec![json!(0x1000000)]));
    assert!(rejected(CommandKind::SetRgb, vec![json!(1), json!("smooth"), json!(500), json!(1)]));
}

#[test]
fn test_set_ct_abx_layout() {
    assert_eq!(
        params_of(CommandKind::SetCtAbx, vec![json!(2700), json!("sudden")]),
        vec![json!(2700), json!("sudden"), json!(0)]
    );
    assert!(rejected(CommandKind::SetCtAbx, vec![json!(1000)]));
}

#[test]
fn test_set_hsv_layout() {
    assert_eq!(
        params_of(CommandKind::SetHsv, vec![json!(120)]),
        vec![json!(120), json!(50), json!("smooth"), json!(300)]
    );
    assert_eq!(
        params_of(CommandKind::SetHsv, vec![json!(120), json!("sudden")]),
        vec![json!(120), json!(50), json!("sudden"), json!(0)]
    );
    assert_eq!(
        params_of(CommandKind::SetHsv, vec![json!(120), json!(70), json!("smooth"), json!(800)]),
        vec![json!(120), json!(70), json!("smooth"), json!(800)]
    );
    assert!(rejected(CommandKind::SetHsv, vec![json!(360)]));
    assert!(rejected(CommandKind::SetHsv, vec![json!(1), json!("smooth"), json!(300), json!(1)]));
}

#[test]
fn test_set_power_layout() {
    assert_eq!(
        params_of(CommandKind::SetPower, vec![json!("on")]),
        vec![json!("on"), json!("smooth"), json!(300)]
    );
    assert!(rejected(CommandKind::SetPower, vec![json!("dim")]));
    assert!(rejected(CommandKind::SetPower, vec![json!(true)]));
    assert_eq!("off".parse::<Power>().unwrap(), Power::Off);
}

#[test]
fn test_set_name_layout() {
    assert_eq!(params_of(CommandKind::SetName, vec![json!("hall")]), vec![json!("hall")]);
    assert!(rejected(CommandKind::SetName, vec![]));
    assert!(rejected(CommandKind::SetName, vec![json!(3)]));
}

#[test]
fn test_no_param_methods() {
    for kind in [CommandKind::Toggle, CommandKind::SetDefault, CommandKind::StopCf] {
        assert!(params_of(kind, vec![]).is_empty());
        assert!(rejected(kind, vec![json!(1)]));
    }
}

#[test]
fn test_get_prop_layout() {
    let command = validate(CommandKind::GetProp, &[json!("power"), json!("rgb")]).unwrap();
    assert_eq!(command.properties(), &[Property::Power, Property::Rgb]);
    assert_eq!(command.to_params(), vec![json!("power"), json!("rgb")]);

    assert!(rejected(CommandKind::GetProp, vec![]));

    let err = validate(CommandKind::GetProp, &[json!("color_mode")]).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("color_mode"));
}

#[test]
fn test_start_cf_layout() {
    let command = validate(
        CommandKind::StartCf,
        &[json!(2), json!(1), json!("1000,2,2700,100,500,7,0,-1")],
    )
    .unwrap();
    assert_eq!(command.kind(), CommandKind::StartCf);
    assert_eq!(command.to_params()[1], json!(1));

    // Count must match the number of steps
    assert!(rejected(CommandKind::StartCf, vec![json!(3), json!(0), json!("1000,1,255,100")]));
    assert!(rejected(CommandKind::StartCf, vec![json!(1), json!(3), json!("1000,1,255,100")]));
    assert!(rejected(CommandKind::StartCf, vec![json!(1), json!(0)]));
}

#[test]
fn test_method_names_round_trip() {
    for kind in CommandKind::ALL {
        assert_eq!(kind.as_str().parse::<CommandKind>().unwrap(), kind);
    }
    let err = "cron_add".parse::<CommandKind>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_immediate_methods() {
    assert!(CommandKind::GetProp.is_immediate());
    assert!(CommandKind::StopCf.is_immediate());
    assert!(!CommandKind::StartCf.is_immediate());
    assert!(!CommandKind::SetRgb.is_immediate());
}
