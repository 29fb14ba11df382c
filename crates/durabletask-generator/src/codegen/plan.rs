//! The emission plan: what goes into the generated file, in order.

use crate::ir::{DiscoveredTasks, FunctionParameter, GenerationMode};
use super::{GENERATED_CLASS_NAME, GENERATED_NAMESPACE};

/// Usings of every generated file.
const BASE_USINGS: &[&str] = &["System", "System.Threading.Tasks", "Microsoft.DurableTask.Client"];

/// Extra usings for host-integrated output.
const HOST_USINGS: &[&str] = &[
    "Microsoft.Azure.Functions.Worker",
    "Microsoft.DurableTask.Internal",
    "Microsoft.Extensions.DependencyInjection",
];

/// One generated file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    pub mode: GenerationMode,
    pub usings: Vec<&'static str>,
    pub namespace: &'static str,
    pub class_name: &'static str,
    pub members: Vec<Member>,
}

/// A member of the generated extension class.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// Shared orchestrator instance used by its trigger.
    OrchestratorSingleton { task_name: String, type_name: String },
    /// Host trigger function that runs an orchestrator.
    OrchestratorTrigger { task_name: String, input: String, output: String },
    /// `ScheduleNew{Name}InstanceAsync` on the client.
    ScheduleWrapper { task_name: String, input_default: String },
    /// `Call{Name}Async` starting a sub-orchestration.
    SubOrchestrationWrapper { task_name: String, input_default: String, output: String },
    /// `Call{Name}Async` for an activity class.
    ActivityWrapper { task_name: String, input: String, output: String },
    /// Host trigger function that runs an activity class.
    ActivityTrigger {
        task_name: String,
        type_name: String,
        input_default: String,
        output: String,
    },
    /// `Call{Name}Async` for an activity function.
    FunctionActivityWrapper {
        name: String,
        parameter: FunctionParameter,
        return_type: String,
    },
    /// `TaskActivityContext` implementation used by activity triggers.
    ContextAdapter,
    /// `AddAllGeneratedTasks` registering every task class.
    RegistrationHelper {
        orchestrators: Vec<String>,
        activities: Vec<String>,
    },
}

/// Lays out the generated file for `tasks` in `mode`.
///
/// Member order: orchestrator singletons, then per orchestrator its trigger,
/// scheduling wrapper and sub-orchestration wrapper, then per activity its call
/// wrapper and trigger, then activity function wrappers, and last either the
/// context adapter (host-integrated) or the registration helper (standalone).
pub fn build(tasks: &DiscoveredTasks, mode: GenerationMode) -> GeneratedUnit {
    let host = mode.is_host_integrated();
    let mut members = Vec::new();

    if host {
        for orchestrator in &tasks.orchestrators {
            members.push(Member::OrchestratorSingleton {
                task_name: orchestrator.task_name.clone(),
                type_name: orchestrator.declared_type_name.clone(),
            });
        }
    }

    for orchestrator in &tasks.orchestrators {
        if host {
            members.push(Member::OrchestratorTrigger {
                task_name: orchestrator.task_name.clone(),
                input: orchestrator.input_type.clone(),
                output: orchestrator.output_type.clone(),
            });
        }
        members.push(Member::ScheduleWrapper {
            task_name: orchestrator.task_name.clone(),
            input_default: orchestrator.input_default_type.clone(),
        });
        members.push(Member::SubOrchestrationWrapper {
            task_name: orchestrator.task_name.clone(),
            input_default: orchestrator.input_default_type.clone(),
            output: orchestrator.output_type.clone(),
        });
    }

    for activity in &tasks.activities {
        members.push(Member::ActivityWrapper {
            task_name: activity.task_name.clone(),
            input: activity.input_type.clone(),
            output: activity.output_type.clone(),
        });
        if host {
            members.push(Member::ActivityTrigger {
                task_name: activity.task_name.clone(),
                type_name: activity.declared_type_name.clone(),
                input_default: activity.input_default_type.clone(),
                output: activity.output_type.clone(),
            });
        }
    }

    for function in &tasks.functions {
        members.push(Member::FunctionActivityWrapper {
            name: function.name.clone(),
            parameter: function.parameter.clone(),
            return_type: function.return_type.clone(),
        });
    }

    if host {
        if !tasks.activities.is_empty() {
            members.push(Member::ContextAdapter);
        }
    } else {
        members.push(Member::RegistrationHelper {
            orchestrators: tasks.orchestrators.iter().map(|t| t.declared_type_name.clone()).collect(),
            activities: tasks.activities.iter().map(|t| t.declared_type_name.clone()).collect(),
        });
    }

    let mut usings = BASE_USINGS.to_vec();
    if host {
        usings.extend_from_slice(HOST_USINGS);
    }

    GeneratedUnit {
        mode,
        usings,
        namespace: GENERATED_NAMESPACE,
        class_name: GENERATED_CLASS_NAME,
        members,
    }
}
