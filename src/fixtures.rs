#[cfg(test)]
pub mod test {
    use crate::config::Config;
    use crate::field::{Argument, Choice};
    use crate::section::Section;
    use crate::types::FieldType;
    use crate::value::{Required, Value};

    /// `host` is required; `port` defaults to 8080.
    pub fn net_section() -> Section {
        Section::new("Net")
            .field(
                "host",
                FieldType::string(),
                Argument::new(Required)
                    .help("Host to connect to")
                    .display_name("HOSTNAME"),
            )
            .field(
                "port",
                FieldType::integer(),
                Argument::new(8080).help("Port to connect to"),
            )
    }

    pub fn app_section() -> Section {
        Section::new("App")
            .field(
                "verbose",
                FieldType::bool(),
                Argument::new(false).help("Enable verbose output"),
            )
            .field(
                "mode",
                FieldType::string(),
                Choice::new(["fast", "slow"]).with_default("fast"),
            )
            .field(
                "tags",
                FieldType::sequence(FieldType::string()),
                Argument::new(Vec::<String>::new()).help("Tags to attach"),
            )
            .field(
                "level",
                FieldType::optional(FieldType::integer()),
                Argument::new(Value::Null),
            )
    }

    /// `net` then `app`, both declared and unparsed.
    pub fn registry() -> Config {
        let mut config = Config::new().command_name("test");
        config.register("net", net_section()).unwrap();
        config.register("app", app_section()).unwrap();
        config
    }

    #[test]
    fn fixture_registry_has_one_required_field() {
        let config = registry();
        let detection = config.check_required(false).unwrap();
        assert_eq!(detection.location(), "net.host");
    }

    // -- Typed counterpart of `registry()` for extraction tests -----------------

    #[derive(confique::Config, Debug)]
    pub struct AppConfig {
        #[config(nested)]
        pub net: NetConfig,

        #[config(nested)]
        pub app: AppSettings,
    }

    #[derive(confique::Config, Debug)]
    pub struct NetConfig {
        pub host: String,

        #[config(default = 8080)]
        pub port: u16,
    }

    #[derive(confique::Config, Debug)]
    pub struct AppSettings {
        #[config(default = false)]
        pub verbose: bool,

        #[config(default = "fast")]
        pub mode: String,

        #[config(default = [])]
        pub tags: Vec<String>,

        pub level: Option<u8>,
    }
}
