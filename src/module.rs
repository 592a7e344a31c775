use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{CatalogError, OperationHandle, SharedOperationCatalog};
use crate::controls::{ControlSet, ControlSpec};
use crate::resolver::{friendly_operation_names, resolve_operation_by_name};

pub const MODULE_NAME: &str = "RunImageJ";
pub const VARIABLE_REVISION_NUMBER: u32 = 1;

pub const INPUT_IMAGE_KEY: &str = "x_name";
pub const OUTPUT_IMAGE_KEY: &str = "y_name";
pub const OPERATION_SELECTOR_KEY: &str = "ij_module";

const OPERATION_SELECTOR_LABEL: &str = "ImageJ module";
const OPERATION_SELECTOR_POSITION: usize = 2;

/// One host-visible setting: its persistence key and control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettingRef<'a> {
    pub key: &'a str,
    pub control: &'a ControlSpec,
}

/// Notifications the host delivers to the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SettingChanged { key: String, value: String },
}

/// Result of handling a [`HostEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Unchanged,
    ControlsRebuilt,
}

/// Pipeline module that exposes the inputs of a selected ImageJ operation as host settings.
pub struct RunImageJModule {
    catalog: SharedOperationCatalog,
    input_image: ControlSpec,
    output_image: ControlSpec,
    selector: ControlSpec,
    selected: Option<String>,
    operation: Option<OperationHandle>,
    controls: ControlSet,
}

impl std::fmt::Debug for RunImageJModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunImageJModule")
            .field("selected", &self.selected)
            .field("operation", &self.operation)
            .field("controls", &self.controls)
            .finish_non_exhaustive()
    }
}

impl RunImageJModule {
    /// Discovers the available operations and builds the controls of the initial selection:
    /// `preferred` when it is one of the choices, otherwise the first choice.
    pub fn create(
        catalog: SharedOperationCatalog,
        preferred: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let choices = friendly_operation_names(catalog.as_ref())?;
        let initial = preferred
            .filter(|name| choices.iter().any(|choice| choice == name))
            .map(str::to_string)
            .or_else(|| choices.first().cloned());

        let mut module = Self {
            catalog,
            input_image: ControlSpec::ImageReference {
                label: String::from("Select the input image"),
            },
            output_image: ControlSpec::ImageOutput {
                label: String::from("Name the output image"),
                default: String::from("ImageProcessing"),
            },
            selector: ControlSpec::Choice {
                label: String::from(OPERATION_SELECTOR_LABEL),
                options: choices,
            },
            selected: None,
            operation: None,
            controls: ControlSet::new(),
        };
        if let Some(name) = initial {
            module.select_operation(name.as_str())?;
        }
        Ok(module)
    }

    pub fn module_name(&self) -> &'static str {
        MODULE_NAME
    }

    pub fn variable_revision_number(&self) -> u32 {
        VARIABLE_REVISION_NUMBER
    }

    pub fn operation_choices(&self) -> &[String] {
        match &self.selector {
            ControlSpec::Choice { options, .. } => options.as_slice(),
            _ => &[],
        }
    }

    pub fn selected_operation(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn operation(&self) -> Option<&OperationHandle> {
        self.operation.as_ref()
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    /// Host base settings, then the operation selector, then the operation's controls.
    /// This is the order used to save and load pipelines.
    pub fn settings(&self) -> Vec<SettingRef<'_>> {
        let mut settings = vec![
            SettingRef {
                key: INPUT_IMAGE_KEY,
                control: &self.input_image,
            },
            SettingRef {
                key: OUTPUT_IMAGE_KEY,
                control: &self.output_image,
            },
            SettingRef {
                key: OPERATION_SELECTOR_KEY,
                control: &self.selector,
            },
        ];
        settings.extend(
            self.controls
                .iter()
                .map(|(key, control)| SettingRef { key, control }),
        );
        settings
    }

    pub fn visible_settings(&self) -> Vec<SettingRef<'_>> {
        self.settings()
    }

    pub fn handle_event(&mut self, event: HostEvent) -> Result<EventOutcome, CatalogError> {
        match event {
            HostEvent::SettingChanged { key, value } => {
                if key != OPERATION_SELECTOR_KEY {
                    return Ok(EventOutcome::Unchanged);
                }
                self.select_operation(value.as_str())?;
                Ok(EventOutcome::ControlsRebuilt)
            }
        }
    }

    /// Rebuilds the controls for a saved pipeline before the host assigns the saved values,
    /// so the value list lines up with [`Self::settings`].
    pub fn prepare_settings(&mut self, saved_values: &[String]) -> Result<(), CatalogError> {
        let Some(saved) = saved_values.get(OPERATION_SELECTOR_POSITION) else {
            return Ok(());
        };
        if self.selected.as_deref() == Some(saved.as_str()) {
            return Ok(());
        }
        self.select_operation(saved.as_str())
    }

    /// Resolves `short_name` and replaces the current controls. The selection records the
    /// resolved operation's short name. On failure the previous selection and controls are
    /// left untouched.
    pub fn select_operation(&mut self, short_name: &str) -> Result<(), CatalogError> {
        let (operation, controls) = resolve_operation_by_name(self.catalog.as_ref(), short_name)?;
        info!(
            operation = %operation.id(),
            controls = controls.len(),
            "selected ImageJ operation"
        );
        self.selected = Some(operation.short_name().to_string());
        self.operation = Some(operation);
        self.controls = controls;
        Ok(())
    }

    /// Per-image function handed to the host's run step.
    pub fn function(&self) -> fn(DynamicImage) -> DynamicImage {
        identity
    }

    pub fn run(&self, image: DynamicImage) -> DynamicImage {
        debug!(
            operation = self.selected.as_deref().unwrap_or("<none>"),
            "running pass-through image function"
        );
        (self.function())(image)
    }
}

fn identity(image: DynamicImage) -> DynamicImage {
    image
}
