//! Prompt assembly for classification and reflection calls.
//!
//! The intent catalog is the router's whole contract with the model: each
//! entry names an intent, documents its parameters (every one optional,
//! defaulting to "not specified"), and gives a few example utterances. The
//! endpoint is expected to answer with exactly one `Call:`-prefixed function
//! call drawn from this catalog.

/// Fixed catalog of recognized intents, embedded in every prompt.
pub const INTENT_CATALOG: &str = r#"You are the intent router for a cloud deployment assistant. Map the user's request to exactly one of the functions below.

Available functions:

1. select_instance_type(cpu: int = None, ram: float = None)
   Finds the most suitable instance type for the given CPU core and RAM
   (gigabyte) requirements. Either parameter may be omitted.
   Examples: '2 ram and 1 cpu', '3 cpu', '4 ram'

2. confirm_deployment()
   The user confirms the shown configuration and wants to deploy. Use when
   the user answers in the affirmative that the deployment looks good.
   Examples: 'yes', 'looks good'

3. enable_autoscaling()
   The user wants autoscaling enabled for the deployment.
   Examples: 'enable autoscaling', 'autoscaling'

4. show_deployment_config()
   The user asks to see the current deployment settings.
   Examples: 'show config', 'display deployment settings'

5. modify_instance_config(InstanceType: str = None, ImageId: str = None, MinCount: int = None, MaxCount: int = None)
   The user changes one or more instance settings. Pass only the parameters
   the user actually names; leave every other parameter as None. If the user
   names a parameter that does not exist, pass it through as written.
   Examples: 'change min count to 3', 'set instance type to t3.large'

6. modify_scaling_config(LaunchTemplateName: str = None, VPCZoneIdentifier: str = None, AvailabilityZones: list = None, MinSize: int = None, MaxSize: int = None, DesiredCapacity: int = None)
   The user changes one or more autoscaling settings. Pass only the
   parameters the user actually names; leave every other parameter as None.
   Examples: 'change autoscaling min size to 3', 'set desired capacity to 5',
   'change availability zones to us-east-1a and us-east-1b'

7. out_of_scope()
   The query relates to none of the functions above. Never use this to fill
   in for another function's parameters.
   Examples: 'Hello', "what's the capital of France"

Respond with ONLY one function call on a single line, prefixed with "Call:". For example:
Call: select_instance_type(cpu=2, ram=4.0)"#;

/// Prompt for the first classification pass. `history` excludes the current
/// utterance, which rides separately as the current query.
pub fn classification_prompt(history: &str, query: &str) -> String {
    render(history, query)
}

/// Prompt for the reflection pass. Identical shape; the caller passes the
/// full transcript including the just-produced agent reply, so the model can
/// see and override the first classification.
pub fn reflection_prompt(history: &str, query: &str) -> String {
    render(history, query)
}

fn render(history: &str, query: &str) -> String {
    format!(
        "<human>\n{INTENT_CATALOG}\n\nConversation History:\n{history}\n\nCurrent User Query: {query}\n<human_end>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_catalog_history_and_query() {
        let prompt = classification_prompt("<human> hi <human_end>", "show config");
        assert!(prompt.starts_with("<human>\n"));
        assert!(prompt.contains("select_instance_type"));
        assert!(prompt.contains("Conversation History:\n<human> hi <human_end>"));
        assert!(prompt.contains("Current User Query: show config"));
        assert!(prompt.ends_with("<human_end>"));
    }

    #[test]
    fn catalog_names_every_intent() {
        for intent in [
            "select_instance_type",
            "confirm_deployment",
            "enable_autoscaling",
            "show_deployment_config",
            "modify_instance_config",
            "modify_scaling_config",
            "out_of_scope",
        ] {
            assert!(INTENT_CATALOG.contains(intent), "catalog missing {intent}");
        }
    }
}
