use ai_sentinel::{
    create_provider, detect_provider_type, AzureOpenAIConfig, BlockingLlmProvider, GeminiConfig,
    GenerateRequest, OllamaConfig, OpenAIConfig, ProviderConfig, ProviderType, SentinelError,
    VllmConfig,
};

fn all_configs() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::AzureOpenAI(AzureOpenAIConfig::new(
            "https://contoso.openai.azure.com",
            "2024-06-01",
            "judge-deployment",
            "azure-secret",
        )),
        ProviderConfig::Gemini(GeminiConfig::new("gemini-2.0-flash", "gemini-secret")),
        ProviderConfig::OpenAI({
            let mut config = OpenAIConfig::new("http://llm.internal:8000/v1", "judge");
            config.api_key = "openai-secret".to_string();
            config
        }),
        ProviderConfig::Vllm({
            let mut config = VllmConfig::new("http://gpu-box:8000/v1", "Qwen/Qwen2.5-7B-Instruct");
            config.api_key = "vllm-secret".to_string();
            config
        }),
        ProviderConfig::Ollama({
            let mut config = OllamaConfig::new("llama3.1");
            config.api_key = "ollama-secret".to_string();
            config
        }),
    ]
}

#[test]
fn test_create_provider_matches_configured_type() {
    for config in all_configs() {
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), config.provider_type().as_str());
    }
}

#[test]
fn test_describe_never_exposes_credentials() {
    for config in all_configs() {
        let provider = create_provider(&config).unwrap();
        let info = provider.describe();
        let rendered = serde_json::to_string(&info).unwrap();

        assert!(!rendered.contains("secret"), "{rendered}");
        assert_eq!(info.model, config.model().trim_start_matches("models/"));
        assert_eq!(info.timeout_secs, 30.0);
    }
}

#[test]
fn test_describe_reports_endpoints() {
    let configs = all_configs();

    let azure = create_provider(&configs[0]).unwrap().describe();
    assert_eq!(
        azure.extra_config.get("azure_endpoint").map(String::as_str),
        Some("https://contoso.openai.azure.com")
    );
    assert_eq!(
        azure.extra_config.get("api_version").map(String::as_str),
        Some("2024-06-01")
    );

    let ollama = create_provider(&configs[4]).unwrap().describe();
    assert_eq!(
        ollama.extra_config.get("base_url").map(String::as_str),
        Some("http://localhost:11434")
    );
}

#[test]
fn test_construction_fails_fast() {
    let mut empty_key = GeminiConfig::new("gemini-2.0-flash", "");
    assert!(matches!(
        create_provider(&ProviderConfig::Gemini(empty_key.clone())),
        Err(SentinelError::Configuration(_))
    ));

    empty_key.api_key = "k".to_string();
    empty_key.timeout_secs = 0.0;
    assert!(matches!(
        create_provider(&ProviderConfig::Gemini(empty_key)),
        Err(SentinelError::Configuration(_))
    ));

    let empty_model = OpenAIConfig::new("http://llm.internal/v1", " ");
    assert!(matches!(
        create_provider(&ProviderConfig::OpenAI(empty_model)),
        Err(SentinelError::Configuration(_))
    ));

    let missing_endpoint = AzureOpenAIConfig::new("", "2024-06-01", "judge", "k");
    assert!(matches!(
        create_provider(&ProviderConfig::AzureOpenAI(missing_endpoint)),
        Err(SentinelError::Configuration(_))
    ));

    let bad_url = VllmConfig::new("not a url", "m");
    assert!(matches!(
        create_provider(&ProviderConfig::Vllm(bad_url)),
        Err(SentinelError::Configuration(_))
    ));
}

#[test]
fn test_timeout_too_large_for_duration_is_configuration_error() {
    let mut config = OpenAIConfig::new("http://llm.internal/v1", "judge");
    config.timeout_secs = 1e20;
    assert!(matches!(
        create_provider(&ProviderConfig::OpenAI(config)),
        Err(SentinelError::Configuration(_))
    ));

    let mut config = OllamaConfig::new("llama3.1");
    config.timeout_secs = f64::MAX;
    assert!(matches!(
        create_provider(&ProviderConfig::Ollama(config)),
        Err(SentinelError::Configuration(_))
    ));
}

#[test]
fn test_detect_provider_type() {
    assert_eq!(
        detect_provider_type("https://contoso.openai.azure.com/"),
        ProviderType::AzureOpenAI
    );
    assert_eq!(
        detect_provider_type("https://generativelanguage.googleapis.com/v1beta"),
        ProviderType::Gemini
    );
    assert_eq!(
        detect_provider_type("http://localhost:11434"),
        ProviderType::Ollama
    );
    assert_eq!(
        detect_provider_type("http://gpu-box:8000/v1"),
        ProviderType::OpenAI
    );
}

#[test]
fn test_blocking_generate_rejects_empty_prompt() {
    let provider = create_provider(&all_configs()[2]).unwrap();
    let result = provider.generate_blocking(GenerateRequest::new(""));
    assert!(matches!(result, Err(SentinelError::InvalidInput(_))));
}

#[tokio::test]
async fn test_blocking_validation_inside_runtime_reports_false() {
    // Nothing listens on the discard port, so the probe fails quickly
    let mut config = OpenAIConfig::new("http://127.0.0.1:9/v1", "judge");
    config.timeout_secs = 1.0;
    let provider = create_provider(&ProviderConfig::OpenAI(config)).unwrap();

    assert!(!provider.validate_credentials_blocking());
}
