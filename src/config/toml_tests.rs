//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_gitlab_section() {
        let toml = r#"
            [gitlab]
            url = "https://gitlab.example.com"
            api_version = "v4"
            requester = "octocat"
            access_token = "glpat-123"
            cache_size = 64
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let gitlab = &config.gitlab;

        assert_eq!(gitlab.url.as_deref(), Some("https://gitlab.example.com"));
        assert_eq!(gitlab.api_version.as_deref(), Some("v4"));
        assert_eq!(gitlab.requester.as_deref(), Some("octocat"));
        assert_eq!(gitlab.access_token.as_deref(), Some("glpat-123"));
        assert_eq!(gitlab.cache_size, Some(64));
    }

    #[test]
    fn parse_server_section() {
        let toml = r#"
            [server]
            bind = "0.0.0.0:9000"
            secret = "s3cret"
            events = ["Push Hook", "Pipeline Hook"]
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let server = &config.server;

        assert_eq!(server.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(server.secret.as_deref(), Some("s3cret"));
        assert_eq!(server.events, vec!["Push Hook", "Pipeline Hook"]);
    }

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.gitlab.url.is_none());
        assert!(config.gitlab.cache_size.is_none());
        assert!(config.server.secret.is_none());
        assert!(config.server.events.is_empty());
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            [gitlab]
            token = "typo-for-access_token"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn reject_unknown_sections() {
        let toml = r#"
            [webhook]
            url = "https://example.com"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn reject_wrong_types() {
        let toml = r#"
            [gitlab]
            cache_size = "large"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }
}

mod default_template {
    use super::*;

    #[test]
    fn template_is_valid_toml() {
        let template = default_config_template();
        let result = TomlConfig::parse(&template);
        assert!(
            result.is_ok(),
            "Template should be valid TOML: {:?}",
            result.err()
        );
    }

    #[test]
    fn template_contains_all_sections() {
        let template = default_config_template();

        assert!(template.contains("[gitlab]"));
        assert!(template.contains("[server]"));
    }

    #[test]
    fn template_values_match_defaults() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(
            config.gitlab.cache_size,
            Some(crate::config::defaults::CACHE_SIZE)
        );
        assert_eq!(
            config.server.bind.as_deref(),
            Some(crate::config::defaults::BIND)
        );
        assert!(config.gitlab.access_token.is_none());
        assert!(config.server.secret.is_none());
    }

    #[test]
    fn template_documents_every_field() {
        let template = default_config_template();

        for field in [
            "url",
            "api_version",
            "requester",
            "access_token",
            "cache_size",
            "bind",
            "secret",
            "events",
        ] {
            assert!(template.contains(field), "Template should document {field}");
        }
    }
}

mod file_loading {
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [gitlab]
            url = "https://gitlab.example.com"
        "#
        )
        .unwrap();

        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(
            config.gitlab.url.as_deref(),
            Some("https://gitlab.example.com")
        );
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let path = Path::new("nonexistent_config_file_12345.toml");
        let result = TomlConfig::load(path);

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_invalid_toml_file_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let result = TomlConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
