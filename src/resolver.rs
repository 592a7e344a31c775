use tracing::debug;

use crate::catalog::{short_name_of, CatalogError, OperationCatalog, OperationHandle};
use crate::classify::is_infrastructure_type;
use crate::controls::{build_control, ControlSet};
use crate::descriptor::InputDescriptor;

/// Fetches the operation's inputs and builds its controls. Collaborator errors are
/// returned as-is, before any control is built.
pub fn resolve_operation_controls(
    catalog: &dyn OperationCatalog,
    operation: &OperationHandle,
) -> Result<ControlSet, CatalogError> {
    let detail = catalog.describe(operation)?;
    Ok(controls_for_inputs(&detail.inputs))
}

/// Looks up `short_name` via the catalog and resolves it.
pub fn resolve_operation_by_name(
    catalog: &dyn OperationCatalog,
    short_name: &str,
) -> Result<(OperationHandle, ControlSet), CatalogError> {
    let operation = catalog.find(short_name)?;
    let controls = resolve_operation_controls(catalog, &operation)?;
    Ok((operation, controls))
}

pub fn controls_for_inputs(inputs: &[InputDescriptor]) -> ControlSet {
    let mut controls = ControlSet::new();
    for input in inputs {
        let raw_type = input.resolved_raw_type();
        if is_infrastructure_type(raw_type) {
            debug!(input = %input.name, raw_type, "skipping injected service/context input");
            continue;
        }
        if let Some(control) = build_control(input) {
            controls.append(input.name.as_str(), control);
        }
    }
    controls
}

// Every operation is offered until the server reports headless capability.
pub fn is_friendly_operation(_operation_id: &str) -> bool {
    true
}

/// Selector choices: short names of friendly operations, sorted and de-duplicated.
pub fn friendly_operation_names(catalog: &dyn OperationCatalog) -> Result<Vec<String>, CatalogError> {
    let mut names = catalog
        .list_operations()?
        .iter()
        .filter(|id| is_friendly_operation(id))
        .map(|id| short_name_of(id).to_string())
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticOperationCatalog;
    use crate::controls::ControlSpec;
    use serde_json::json;

    fn blur_inputs() -> Vec<InputDescriptor> {
        vec![
            InputDescriptor::new("ops", "net.imagej.ops.OpService"),
            InputDescriptor::new("in", "net.imagej.Dataset"),
            InputDescriptor::new("ctx", "org.scijava.Context"),
            InputDescriptor::new("sigma", "double")
                .with_bounds(Some(json!(0.1)), Some(json!(10.0))),
            InputDescriptor::new("preview", "org.scijava.widget.Button"),
            InputDescriptor::new("log", "org.scijava.log.LogService"),
            InputDescriptor::new("mode", "java.lang.String").with_choices(["Fast", "Accurate"]),
            InputDescriptor::new("table", "org.scijava.table.Table"),
        ]
    }

    #[test]
    fn filters_infrastructure_and_unbuildable_inputs_in_order() {
        let controls = controls_for_inputs(&blur_inputs());
        assert_eq!(
            controls.names().collect::<Vec<_>>(),
            vec!["in", "sigma", "mode"]
        );
        assert_eq!(
            controls.get("sigma"),
            Some(&ControlSpec::Float {
                label: String::from("sigma"),
                default: 0.1,
                min: Some(0.1),
                max: Some(10.0),
            })
        );
    }

    #[test]
    fn repeated_input_name_keeps_first_declaration() {
        let controls = controls_for_inputs(&[
            InputDescriptor::new("a", "int"),
            InputDescriptor::new("b", "boolean"),
            InputDescriptor::new("a", "java.lang.String"),
        ]);
        assert_eq!(controls.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(controls.get("a").map(ControlSpec::kind), Some("integer"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = StaticOperationCatalog::new().with_operation("command:demo.Blur", blur_inputs());
        let handle = OperationHandle::new("command:demo.Blur");

        let first = resolve_operation_controls(&catalog, &handle).expect("first resolve");
        let second = resolve_operation_controls(&catalog, &handle).expect("second resolve");
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn describe_failure_is_propagated() {
        let catalog = StaticOperationCatalog::new();
        let err = resolve_operation_controls(&catalog, &OperationHandle::new("command:demo.Gone"))
            .expect_err("missing operation should fail");
        assert!(matches!(err, CatalogError::OperationNotFound(id) if id == "command:demo.Gone"));
    }

    #[test]
    fn friendly_names_are_short_sorted_and_unique() {
        let catalog = StaticOperationCatalog::new()
            .with_operation("command:net.imagej.b.Median", Vec::new())
            .with_operation("command:net.imagej.a.Blur", Vec::new())
            .with_operation("script:other.Median", Vec::new());
        assert_eq!(
            friendly_operation_names(&catalog).expect("names"),
            vec![String::from("Blur"), String::from("Median")]
        );
    }

    #[test]
    fn resolves_by_short_name() {
        let catalog = StaticOperationCatalog::new().with_operation("command:demo.Blur", blur_inputs());
        let (handle, controls) = resolve_operation_by_name(&catalog, "Blur").expect("resolve");
        assert_eq!(handle.id(), "command:demo.Blur");
        assert_eq!(controls.len(), 3);
    }
}
