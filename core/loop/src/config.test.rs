use super::*;

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert!(config.streaming);
    assert!(!config.subagent);
    assert_eq!(config.permission_mode, PermissionMode::Default);
    assert!(config.max_stop_continuations.is_none());
    assert!(config.compressor.input_token_ceiling.is_none());
}

#[test]
fn test_system_prompt_plain() {
    let config = EngineConfig {
        system_prompt: "You are an agent.".to_string(),
        ..EngineConfig::default()
    };
    assert_eq!(
        config.system_prompt_for(PermissionMode::Default),
        "You are an agent."
    );
}

#[test]
fn test_system_prompt_plan_reminder() {
    let config = EngineConfig {
        system_prompt: "Base.".to_string(),
        ..EngineConfig::default()
    };
    let prompt = config.system_prompt_for(PermissionMode::Plan);
    assert!(prompt.starts_with("Base.\n\n"));
    assert!(prompt.contains(PLAN_MODE_REMINDER));

    // No reminder outside plan mode.
    assert!(
        !config
            .system_prompt_for(PermissionMode::AcceptEdits)
            .contains(PLAN_MODE_REMINDER)
    );
}

#[test]
fn test_system_prompt_language_suffix() {
    let config = EngineConfig {
        system_prompt: "Base.".to_string(),
        language: Some("French".to_string()),
        ..EngineConfig::default()
    };
    let prompt = config.system_prompt_for(PermissionMode::Default);
    assert!(prompt.ends_with("Always respond in French."));
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: EngineConfig =
        serde_json::from_str(r#"{"system_prompt": "x"}"#).expect("deserialize");
    assert_eq!(config.system_prompt, "x");
    assert!(config.streaming);
}
