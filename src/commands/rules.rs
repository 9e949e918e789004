//! `wmdr rules` command - list the rubric

use serde_json::{json, Value};
use wmdr_core::error::Result;
use wmdr_core::rubric::{RuleDescriptor, Rubric, SubRule};

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use crate::commands::format::{points, print_json};

/// Execute the rules command
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let rubric = ctx.config()?.rubric()?;

    match ctx.cli.format {
        OutputFormat::Json => print_json(&rubric_json(&rubric)),
        OutputFormat::Human => {
            print_human(&rubric, ctx.cli.quiet);
            Ok(())
        }
    }
}

fn rubric_json(rubric: &Rubric) -> Value {
    rubric.rules().iter().map(rule_json).collect()
}

fn rule_json(rule: &RuleDescriptor) -> Value {
    json!({
        "key": rule.key,
        "name": rule.name,
        "category": rule.category,
        "body": rule.body_kind(),
        "total": rule.declared_total(),
        "policy": rule.policy(),
        "sub_rules": rule.sub_rules().iter().map(sub_rule_json).collect::<Vec<_>>(),
    })
}

fn sub_rule_json(sub: &SubRule) -> Value {
    json!({
        "code": sub.code,
        "key": sub.key(),
        "name": sub.name,
        "total": sub.total,
        "policy": sub.policy,
        "instances": sub.instances.as_ref().map(|spec| spec.element),
    })
}

fn print_human(rubric: &Rubric, quiet: bool) {
    for rule in rubric.rules() {
        let policy = rule
            .policy()
            .map(|p| format!(" [{}]", p))
            .unwrap_or_default();
        println!(
            "{:<8} {:<40} {:>5}  {}{}",
            rule.key,
            rule.name,
            points(rule.declared_total()),
            rule.body_kind(),
            policy
        );
        if quiet {
            continue;
        }
        for sub in rule.sub_rules() {
            let instances = sub
                .instances
                .as_ref()
                .map(|spec| format!(" per {} ({})", spec.element, sub.policy))
                .unwrap_or_default();
            println!(
                "  {:<8} {:<60} {:>5}{}",
                sub.code,
                sub.name,
                points(sub.total),
                instances
            );
        }
    }
}
