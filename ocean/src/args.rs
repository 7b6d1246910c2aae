//! Command-line argument parsing.

use anyhow::{anyhow, bail, Context, Result};
use ocean_core::PipelineConfig;

/// Environment variable consulted when `--top-k` is not given.
pub const TOP_K_ENV: &str = "OCEAN_TOP_K";

/// Build a run configuration from arguments (program name excluded).
///
/// `env_top_k` is the value of [`TOP_K_ENV`], if set. An explicit `--top-k`
/// wins over it.
pub fn parse_config_from_args(
    args: &[String],
    env_top_k: Option<String>,
) -> Result<PipelineConfig> {
    let mut input = None;
    let mut starting_graph = None;
    let mut output = None;
    let mut correlations = None;
    let mut top_k = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" | "-i" => input = Some(value_of(args, i, flag)?),
            "--graph" | "-g" => starting_graph = Some(value_of(args, i, flag)?),
            "--output" | "-o" => output = Some(value_of(args, i, flag)?),
            "--correlations" | "-c" => correlations = Some(value_of(args, i, flag)?),
            "--top-k" | "-k" => top_k = Some(parse_top_k(&value_of(args, i, flag)?)?),
            other if other.starts_with('-') => bail!("unknown option {other:?}"),
            positional => {
                if input.is_some() {
                    bail!("unexpected argument {positional:?}");
                }
                input = Some(positional.to_string());
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    let input = input.ok_or_else(|| anyhow!("no input table given (use --input <PATH>)"))?;
    let mut config = PipelineConfig::new(input);

    if let Some(path) = starting_graph {
        config = config.with_starting_graph(path);
    }
    if let Some(path) = output {
        config = config.with_output(path);
    }
    if let Some(path) = correlations {
        config = config.with_correlation_table(path);
    }
    match (top_k, env_top_k) {
        (Some(k), _) => config = config.with_top_k(k),
        (None, Some(raw)) => {
            let k = parse_top_k(&raw).with_context(|| format!("invalid {TOP_K_ENV}"))?;
            config = config.with_top_k(k);
        }
        (None, None) => {}
    }

    config.validate()?;
    Ok(config)
}

fn value_of(args: &[String], i: usize, flag: &str) -> Result<String> {
    args.get(i + 1)
        .cloned()
        .ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_top_k(raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .with_context(|| format!("top-k must be a number between 1 and 5, got {raw:?}"))
}
