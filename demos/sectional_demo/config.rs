//! Section declarations for the sectional demo application.
//!
//! The `server` section is declared twice: once as the "library" base and
//! once by the application, which adds a field and overrides a default.
//! Registration merges the two.
//!
//! | Flag                    | Section.field              |
//! |-------------------------|----------------------------|
//! | `--host`, `-H`          | `server.host` (required)   |
//! | `--port`, `-p`          | `server.port`              |
//! | `--max_connections`     | `server.max_connections`   |
//! | `--color`               | `display.color`            |
//! | `--format`              | `display.format`           |
//! | `--verbose`, `-v`       | `display.verbose`          |
//! | `--tags`                | `display.tags`             |

use sectional::{Argument, Choice, Config, FieldType, Required, Section, SectionalError, Value};

/// Base server section, as a library would ship it.
pub fn base_server() -> Section {
    Section::new("Server")
        .field(
            "host",
            FieldType::string(),
            Argument::new(Required)
                .flag("-H")
                .help("Hostname to bind to")
                .display_name("HOST"),
        )
        .field(
            "port",
            FieldType::integer(),
            Argument::new(3000).flag("-p").help("Port number"),
        )
        .field("backlog", FieldType::integer(), Value::from(128))
}

/// Application extension of the server section.
pub fn app_server() -> Section {
    Section::new("AppServer")
        .field(
            "port",
            FieldType::integer(),
            Argument::new(8080).flag("-p").help("Port number"),
        )
        .field(
            "max_connections",
            FieldType::integer(),
            Argument::new(100).help("Maximum number of allowed connections"),
        )
}

pub fn display() -> Section {
    Section::new("Display")
        .field(
            "color",
            FieldType::string(),
            Choice::new(["red", "green", "yellow", "blue", "magenta", "cyan", "white"])
                .with_default("yellow"),
        )
        .field(
            "format",
            FieldType::string(),
            Argument::new("pretty")
                .choices(["pretty", "plain"])
                .help("Output format"),
        )
        .field(
            "verbose",
            FieldType::bool(),
            Argument::new(false).flag("-v").help("Enable verbose output"),
        )
        .field(
            "tags",
            FieldType::optional(FieldType::sequence(FieldType::string())),
            Argument::new(Value::Null).help("Tags to print alongside the banner"),
        )
}

pub fn registry() -> Result<Config, SectionalError> {
    let mut config = Config::new()
        .command_name("sectional-demo")
        .about("Showcase for sectioned configuration with synthesized flags");
    config.register("server", base_server())?;
    config.register("display", display())?;
    config.register("server", app_server())?;
    Ok(config)
}

/// Typed view of the resolved registry.
#[derive(confique::Config, Debug)]
pub struct DemoConfig {
    #[config(nested)]
    pub server: ServerConfig,

    #[config(nested)]
    pub display: DisplayConfig,
}

#[derive(confique::Config, Debug)]
pub struct ServerConfig {
    pub host: String,

    #[config(default = 8080)]
    pub port: u16,

    #[config(default = 128)]
    pub backlog: u32,

    #[config(default = 100)]
    pub max_connections: u32,
}

#[derive(confique::Config, Debug)]
pub struct DisplayConfig {
    #[config(default = "yellow")]
    pub color: String,

    #[config(default = "pretty")]
    pub format: String,

    #[config(default = false)]
    pub verbose: bool,

    pub tags: Option<Vec<String>>,
}
