// src/command/builder.rs

//! Assembles the final `{runtime, args, env}` for one test run.
//!
//! The command template holds four placeholders: `${php}` (runtime binary),
//! `${phpargs}` (runtime arguments), `${phpunit}` (framework binary) and
//! `${phpunitargs}` (framework arguments). A template without placeholders
//! is a prefix (`ssh host`, `docker exec app sh -c`, ...) that the default
//! template is appended to.
//!
//! The template is tokenized first. A token that is exactly a placeholder
//! expands to its argument list; a placeholder embedded in a larger token
//! (the quoted tail of `ssh host "${php} ..."`) is replaced with shell-quoted
//! text, because another shell will parse that token again. Filters travel
//! base64-encoded through all of this and are decoded as each argument is
//! placed.
//!
//! Path variables (`${workspaceFolder}`, `${userHome}`, ...) are resolved in
//! the binaries, in every configured argument and in the template itself.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::command::context::ExecutionContext;
use crate::command::invocation::{InvocationSpec, SpawnOptions};
use crate::command::{RunMode, TestTarget, argv, filter_codec};
use crate::errors::{RelayError, Result};
use crate::paths::PathReplacer;

pub const PHP: &str = "${php}";
pub const PHP_ARGS: &str = "${phpargs}";
pub const PHPUNIT: &str = "${phpunit}";
pub const PHPUNIT_ARGS: &str = "${phpunitargs}";

/// Placeholder names accepted in a command template.
pub const PLACEHOLDERS: [&str; 4] = [PHP, PHP_ARGS, PHPUNIT, PHPUNIT_ARGS];

pub const DEFAULT_TEMPLATE: &str = "${php} ${phpargs} ${phpunit} ${phpunitargs}";

static QUOTED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"](\$\{(?:php|phpargs|phpunit|phpunitargs)\})['"]"#)
        .expect("placeholder pattern is valid")
});

static RUNTIME_ARGS_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*(?:"\$\{phpargs\}"|\$\{phpargs\})"#).expect("phpargs pattern is valid")
});

static SSH_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)ssh\s").expect("ssh pattern is valid"));

static SHELL_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sh\s+-c(?:\s|$)").expect("shell pattern is valid"));

static PARATEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)paratest").expect("paratest pattern is valid"));

/// True when the command's argv will be parsed by another shell: it goes
/// through `ssh` or an embedded `sh -c`.
pub fn is_remote_command(template: &str) -> bool {
    SSH_COMMAND.is_match(template) || SHELL_COMMAND.is_match(template)
}

fn references_placeholders(template: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| template.contains(p))
}

/// Normalize a configured command template:
/// 1. a bare prefix gets the default template appended (quoted when another
///    shell will parse it),
/// 2. quoted single-placeholder spans become double-quoted,
/// 3. `${phpargs}` is dropped when there are no runtime arguments.
pub fn prepare_template(template: &str, has_runtime_args: bool) -> String {
    let trimmed = template.trim();
    let mut prepared = if trimmed.is_empty() {
        DEFAULT_TEMPLATE.to_string()
    } else if references_placeholders(trimmed) {
        trimmed.to_string()
    } else if is_remote_command(trimmed) {
        format!("{trimmed} \"{DEFAULT_TEMPLATE}\"")
    } else {
        format!("{trimmed} {DEFAULT_TEMPLATE}")
    };

    prepared = QUOTED_PLACEHOLDER
        .replace_all(&prepared, "\"$1\"")
        .into_owned();

    if !has_runtime_args {
        prepared = RUNTIME_ARGS_PLACEHOLDER
            .replace_all(&prepared, "")
            .into_owned();
    }

    prepared
}

/// Builder for one run's [`InvocationSpec`].
#[derive(Debug, Clone)]
pub struct ProcessBuilder<'a> {
    context: &'a ExecutionContext,
    replacer: &'a PathReplacer,
    mode: RunMode,
    target: TestTarget,
    arguments: Vec<String>,
}

impl<'a> ProcessBuilder<'a> {
    pub fn new(context: &'a ExecutionContext, replacer: &'a PathReplacer) -> Self {
        Self {
            context,
            replacer,
            mode: RunMode::Run,
            target: TestTarget::default(),
            arguments: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: TestTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Extra framework arguments as one shell-style string, e.g.
    /// `--group slow --filter='^.*::test_a$'`.
    pub fn with_arguments(mut self, arguments: &str) -> Result<Self> {
        self.arguments = argv::split(arguments)?;
        Ok(self)
    }

    pub fn build(&self) -> Result<InvocationSpec> {
        let variables = self.replacer.variables();
        let binaries = Binaries {
            runtime: variables.substitute(&self.context.runtime_binary),
            framework: variables.substitute(&self.context.framework_binary),
        };
        let runtime_args = self.runtime_args();
        let framework_args = filter_codec::encode(&self.framework_args(&binaries.framework));

        let template = prepare_template(&self.context.command_template, !runtime_args.is_empty());
        let remote = is_remote_command(&template);

        let mut argv_out: Vec<String> = Vec::new();
        for token in argv::split(&template)? {
            match token.as_str() {
                PHP => argv_out.extend(binary_tokens(&binaries.runtime)),
                PHPUNIT => argv_out.extend(binary_tokens(&binaries.framework)),
                PHP_ARGS => argv_out.extend(runtime_args.iter().map(|a| spliced_arg(a, remote))),
                PHPUNIT_ARGS => argv_out.extend(
                    framework_args
                        .iter()
                        .map(|a| filter_codec::decode_arg(&spliced_arg(a, remote), remote)),
                ),
                _ if references_placeholders(&token) => {
                    let script = filter_codec::decode_arg(
                        &expand_embedded(
                            &variables.substitute(&token),
                            &binaries,
                            &runtime_args,
                            &framework_args,
                        ),
                        true,
                    );
                    // ssh joins its argv and the remote shell splits it again
                    // before `sh -c` sees the script.
                    if is_nested_shell_payload(&argv_out) {
                        argv_out.push(argv::quote_posix(&script));
                    } else {
                        argv_out.push(script);
                    }
                }
                _ => argv_out.push(variables.substitute(&token)),
            }
        }

        let mut argv_out = argv_out.into_iter();
        let runtime = argv_out
            .next()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| RelayError::CommandError(format!("empty command from template '{template}'")))?;
        let args: Vec<String> = argv_out.collect();

        let spec = InvocationSpec {
            runtime,
            args,
            options: SpawnOptions {
                cwd: self.context.working_directory.clone(),
                env: self.environment(),
            },
        };

        debug!(command = %spec.command_line(), remote, "built invocation");
        Ok(spec)
    }

    fn runtime_args(&self) -> Vec<String> {
        let variables = self.replacer.variables();
        let mut args: Vec<String> = self
            .context
            .runtime_args
            .iter()
            .map(|a| variables.substitute(a))
            .collect();
        if let RunMode::Debug { port } = &self.mode {
            args.push("-dxdebug.mode=debug".to_string());
            args.push("-dxdebug.start_with_request=1".to_string());
            if let Some(port) = port {
                args.push(format!("-dxdebug.client_port={port}"));
            }
        }
        args
    }

    fn framework_args(&self, framework_binary: &str) -> Vec<String> {
        let variables = self.replacer.variables();
        let mut args: Vec<String> = self
            .context
            .extra_args
            .iter()
            .chain(self.arguments.iter())
            .filter(|a| !a.starts_with("--colors") && a.as_str() != "--teamcity")
            .map(|a| variables.substitute(a))
            .collect();

        if let Some(path) = &self.target.path {
            args.push(self.replacer.to_remote(path));
        }
        if let Some(filter) = &self.target.filter {
            args.push(format!("--filter={filter}"));
        }
        if let RunMode::Coverage { clover_file } = &self.mode {
            args.push(format!(
                "--coverage-clover={}",
                self.replacer.to_remote(&clover_file.to_string_lossy())
            ));
        }

        args.push("--colors=never".to_string());
        args.push("--teamcity".to_string());

        let has_filter = args.iter().any(|a| a.starts_with("--filter="));
        let functional = args.iter().any(|a| a == "--functional");
        if has_filter && !functional && PARATEST.is_match(framework_binary) {
            args.push("--functional".to_string());
        }

        args
    }

    fn environment(&self) -> BTreeMap<String, String> {
        let mut env = self.context.environment.clone();
        match &self.mode {
            RunMode::Run => {}
            RunMode::Debug { .. } => {
                env.insert("XDEBUG_MODE".to_string(), "debug".to_string());
            }
            RunMode::Coverage { .. } => {
                env.insert("XDEBUG_MODE".to_string(), "coverage".to_string());
            }
        }
        env
    }
}

/// Runtime and framework binaries with path variables resolved.
struct Binaries {
    runtime: String,
    framework: String,
}

/// Expand placeholders inside a token that another shell will re-parse.
fn expand_embedded(
    token: &str,
    binaries: &Binaries,
    runtime_args: &[String],
    framework_args: &[String],
) -> String {
    let join = |args: &[String]| {
        args.iter()
            .map(|a| argv::quote_posix(a))
            .collect::<Vec<_>>()
            .join(" ")
    };

    token
        .replace(PHP_ARGS, &join(runtime_args))
        .replace(PHPUNIT_ARGS, &join(framework_args))
        .replace(PHPUNIT, &quote_binary(&binaries.framework))
        .replace(PHP, &quote_binary(&binaries.runtime))
}

/// True when the next argv entry is the script of an `sh -c` that itself
/// runs behind `ssh`, so two shells parse it before it executes.
fn is_nested_shell_payload(argv_so_far: &[String]) -> bool {
    let [.., shell, flag] = argv_so_far else {
        return false;
    };
    let through_ssh = argv_so_far.iter().any(|a| program_name(a) == "ssh");
    through_ssh && flag == "-c" && matches!(program_name(shell), "sh" | "bash" | "dash" | "ash" | "zsh")
}

fn program_name(arg: &str) -> &str {
    arg.rsplit(['/', '\\']).next().unwrap_or(arg)
}

fn has_separator_and_space(binary: &str) -> bool {
    binary.contains(['/', '\\']) && binary.contains(' ')
}

/// A binary path with a space stays one argument; anything else is split,
/// so `artisan test` becomes two arguments.
fn binary_tokens(binary: &str) -> Vec<String> {
    if has_separator_and_space(binary) {
        return vec![binary.to_string()];
    }
    argv::split(binary).unwrap_or_else(|_| vec![binary.to_string()])
}

fn quote_binary(binary: &str) -> String {
    if has_separator_and_space(binary) {
        format!("\"{binary}\"")
    } else {
        binary.to_string()
    }
}

/// Arguments spliced as their own argv entries only need quoting when a
/// remote shell will join and re-parse them.
fn spliced_arg(arg: &str, remote: bool) -> String {
    if remote {
        argv::quote_posix(arg)
    } else {
        arg.to_string()
    }
}
