//! Generation mode selection.

use serde::Serialize;

/// Referenced module that switches generation to the Azure Functions flavour.
pub const HOST_INTEGRATION_MODULE: &str = "Microsoft.Azure.Functions.Worker.Extensions.DurableTask";

/// Which extra members the generated class carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Azure Functions: trigger declarations plus an activity context adapter.
    HostIntegrated,
    /// Plain worker: a bulk registration helper.
    Standalone,
}

impl GenerationMode {
    /// Host-integrated iff the integration module is referenced (case-insensitive).
    pub fn detect<S: AsRef<str>>(referenced_modules: &[S]) -> Self {
        let integrated = referenced_modules
            .iter()
            .any(|name| name.as_ref().eq_ignore_ascii_case(HOST_INTEGRATION_MODULE));
        if integrated {
            GenerationMode::HostIntegrated
        } else {
            GenerationMode::Standalone
        }
    }

    pub fn is_host_integrated(self) -> bool {
        self == GenerationMode::HostIntegrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_case_insensitive() {
        let refs = ["Microsoft.DurableTask.Worker", "microsoft.azure.functions.worker.extensions.durabletask"];
        assert_eq!(GenerationMode::detect(&refs), GenerationMode::HostIntegrated);
    }

    #[test]
    fn test_detect_requires_exact_name() {
        let refs = ["Microsoft.Azure.Functions.Worker.Extensions.DurableTask.Preview"];
        assert_eq!(GenerationMode::detect(&refs), GenerationMode::Standalone);

        let none: [&str; 0] = [];
        assert_eq!(GenerationMode::detect(&none), GenerationMode::Standalone);
    }
}
