//! Implementation of the `graft list` command.

use graft_core::{
    application::{PluginInfo, PluginService},
    domain::ProjectKind,
};

use crate::{
    cli::{ListArgs, ListFormat, OutputFormat},
    commands::add::build_registry,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let registry = build_registry(&config, &output)?;
    let service = PluginService::new(Box::new(registry));

    let plugins = match args.kind {
        Some(kind) => service.for_kind(ProjectKind::from(kind))?,
        None => service.list()?,
    };
    let plugins: Vec<PluginInfo> = plugins.iter().map(PluginInfo::from).collect();

    // `--output-format json` applies to every command.
    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            if plugins.is_empty() {
                output.warning("No plugins match")?;
                return Ok(());
            }
            output.header("Available Plugins:")?;
            let width = plugins.iter().map(|p| p.id.len()).max().unwrap_or(0);
            for plugin in &plugins {
                output.print(&format!(
                    "  {:<width$}  {} [{}]",
                    plugin.id,
                    plugin.name,
                    plugin.kinds.join(", "),
                ))?;
                if !plugin.description.is_empty() {
                    output.print(&format!("  {:<width$}  {}", "", plugin.description))?;
                }
            }
        }

        // JSON goes straight to stdout so it stays parseable in pipes.
        ListFormat::Json => output.json(&plugins)?,

        ListFormat::List => {
            for plugin in &plugins {
                println!("{}", plugin.id);
            }
        }

        ListFormat::Csv => {
            println!("id,name,kinds,files,modifies");
            for plugin in &plugins {
                println!("{}", csv_row(plugin));
            }
        }
    }

    Ok(())
}

fn csv_row(plugin: &PluginInfo) -> String {
    [
        csv_field(&plugin.id),
        csv_field(&plugin.name),
        csv_field(&plugin.kinds.join(" ")),
        plugin.files.to_string(),
        csv_field(&plugin.modifies.join(" ")),
    ]
    .join(",")
}

/// Quote a field containing a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(csv_field("dataFetching"), "dataFetching");
    }

    #[test]
    fn separators_and_quotes_are_escaped() {
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn row_joins_multi_valued_columns() {
        let info = PluginInfo {
            id: "httpClient".into(),
            name: "HTTP client".into(),
            description: String::new(),
            kinds: vec!["next".into(), "react-vite".into()],
            files: 2,
            modifies: vec![],
            tags: vec![],
        };
        assert_eq!(csv_row(&info), "httpClient,HTTP client,next react-vite,2,");
    }
}
