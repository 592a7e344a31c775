use tracing::{debug, warn};

use super::{coerce_default, ColorRgb, ControlSpec};
use crate::classify::{classify, is_ignored, TypeCategory};
use crate::descriptor::{value_as_f64, value_as_i64, value_as_text, InputDescriptor};

/// Builds the control for one input, or `None` when the input's type is ignored
/// or has no control mapping.
pub fn build_control(input: &InputDescriptor) -> Option<ControlSpec> {
    let raw_type = input.resolved_raw_type();
    if is_ignored(raw_type) {
        debug!(input = %input.name, raw_type, "ignoring operation input");
        return None;
    }

    let text = input.display_text().to_string();
    let style = input.widget_style_lower();

    match classify(raw_type) {
        TypeCategory::Boolean => Some(ControlSpec::Binary {
            label: text,
            default: input
                .default_value
                .as_ref()
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
        }),
        TypeCategory::Color => Some(ControlSpec::Color {
            label: text,
            default: input.default_value.as_ref().and_then(ColorRgb::from_value),
        }),
        TypeCategory::File => {
            if style.starts_with("directory") {
                return Some(ControlSpec::Directory { label: text });
            }
            // "open", "save" and unspecified styles share one path control.
            Some(ControlSpec::Path {
                label: text,
                default: value_as_text(input.default_value.as_ref()),
            })
        }
        TypeCategory::Float => {
            let min = value_as_f64(input.minimum_value.as_ref());
            let max = value_as_f64(input.maximum_value.as_ref());
            Some(ControlSpec::Float {
                label: text,
                default: coerce_default(value_as_f64(input.default_value.as_ref()), min),
                min,
                max,
            })
        }
        TypeCategory::Image => Some(ControlSpec::ImageReference { label: text }),
        TypeCategory::Integer => {
            let min = value_as_i64(input.minimum_value.as_ref());
            let max = value_as_i64(input.maximum_value.as_ref());
            Some(ControlSpec::Integer {
                label: text,
                default: coerce_default(value_as_i64(input.default_value.as_ref()), min),
                min,
                max,
            })
        }
        TypeCategory::Text => {
            if let Some(choices) = input.choices.as_ref().filter(|c| !c.is_empty()) {
                return Some(ControlSpec::Choice {
                    label: text,
                    options: choices.clone(),
                });
            }
            let default = value_as_text(input.default_value.as_ref());
            if style.starts_with("text area") {
                Some(ControlSpec::MultilineText {
                    label: text,
                    default,
                })
            } else {
                Some(ControlSpec::Text {
                    label: text,
                    default,
                })
            }
        }
        TypeCategory::Ignored => None,
        TypeCategory::Unsupported => {
            warn!(input = %input.name, raw_type, "unsupported operation input type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn float_without_default_uses_minimum() {
        let input = InputDescriptor::new("sigma", "double")
            .with_bounds(Some(json!(0.1)), Some(json!(10.0)));

        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Float {
                label: String::from("sigma"),
                default: 0.1,
                min: Some(0.1),
                max: Some(10.0),
            })
        );
    }

    #[test]
    fn boolean_keeps_declared_default() {
        let input = InputDescriptor::new("doIt", "boolean").with_default(json!(true));
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Binary {
                label: String::from("doIt"),
                default: true,
            })
        );
    }

    #[test]
    fn directory_style_yields_directory_control() {
        let input = InputDescriptor::new("outDir", "java.io.File").with_widget_style("directory");
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Directory {
                label: String::from("outDir"),
            })
        );
    }

    #[test]
    fn file_styles_other_than_directory_yield_path_control() {
        for style in ["open", "save", "", "extensions:tif"] {
            let input = InputDescriptor::new("in", "java.io.File").with_widget_style(style);
            assert_eq!(
                build_control(&input),
                Some(ControlSpec::Path {
                    label: String::from("in"),
                    default: String::new(),
                }),
                "style {style:?}"
            );
        }
        let with_default =
            InputDescriptor::new("in", "java.io.File").with_default(json!("/tmp/a.tif"));
        assert_eq!(
            build_control(&with_default),
            Some(ControlSpec::Path {
                label: String::from("in"),
                default: String::from("/tmp/a.tif"),
            })
        );
    }

    #[test]
    fn button_is_ignored() {
        let input = InputDescriptor::new("btn", "org.scijava.widget.Button");
        assert_eq!(build_control(&input), None);
    }

    #[test]
    fn unknown_type_yields_nothing() {
        let input = InputDescriptor::new("table", "org.scijava.table.Table<C, T>");
        assert_eq!(build_control(&input), None);
    }

    #[test]
    fn choices_override_text_area_style() {
        let input = InputDescriptor::new("mode", "java.lang.String")
            .with_choices(["Fast", "Accurate"])
            .with_widget_style("text area");
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Choice {
                label: String::from("mode"),
                options: vec![String::from("Fast"), String::from("Accurate")],
            })
        );
    }

    #[test]
    fn text_area_style_is_case_insensitive() {
        let input = InputDescriptor::new("script", "java.lang.String")
            .with_widget_style("Text Area")
            .with_default(json!("print(1)"));
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::MultilineText {
                label: String::from("script"),
                default: String::from("print(1)"),
            })
        );
    }

    #[test]
    fn empty_choices_fall_back_to_text() {
        let input = InputDescriptor::new("note", "java.lang.String").with_choices(Vec::<String>::new());
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Text {
                label: String::from("note"),
                default: String::new(),
            })
        );
    }

    #[test]
    fn label_takes_precedence_over_name() {
        let input = InputDescriptor::new("radius", "int")
            .with_label("Radius (px)")
            .with_default(json!(3))
            .with_bounds(Some(json!(1)), Some(json!(50)));
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Integer {
                label: String::from("Radius (px)"),
                default: 3,
                min: Some(1),
                max: Some(50),
            })
        );
    }

    #[test]
    fn non_finite_defaults_fall_back_to_minimum() {
        let sigma = InputDescriptor::new("sigma", "double")
            .with_default(json!("NaN"))
            .with_bounds(Some(json!(1)), Some(json!(10)));
        assert_eq!(
            build_control(&sigma),
            Some(ControlSpec::Float {
                label: String::from("sigma"),
                default: 1.0,
                min: Some(1.0),
                max: Some(10.0),
            })
        );

        let radius = InputDescriptor::new("radius", "int")
            .with_default(json!("inf"))
            .with_bounds(Some(json!(1)), Some(json!(10)));
        assert_eq!(
            build_control(&radius),
            Some(ControlSpec::Integer {
                label: String::from("radius"),
                default: 1,
                min: Some(1),
                max: Some(10),
            })
        );
    }

    #[test]
    fn integer_without_default_or_minimum_is_zero() {
        let input = InputDescriptor::new("count", "java.lang.Integer");
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Integer {
                label: String::from("count"),
                default: 0,
                min: None,
                max: None,
            })
        );
    }

    #[test]
    fn generic_image_types_yield_image_reference() {
        let input = InputDescriptor::new("in", "net.imglib2.RandomAccessibleInterval<T>");
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::ImageReference {
                label: String::from("in"),
            })
        );
    }

    #[test]
    fn color_default_is_parsed() {
        let input = InputDescriptor::new("tint", "org.scijava.util.ColorRGB")
            .with_default(json!({"red": 1, "green": 2, "blue": 3}));
        assert_eq!(
            build_control(&input),
            Some(ControlSpec::Color {
                label: String::from("tint"),
                default: Some(ColorRgb::new(1, 2, 3)),
            })
        );
    }
}
