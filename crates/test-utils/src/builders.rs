use std::collections::BTreeMap;
use std::path::PathBuf;

use phpunit_relay::command::ExecutionContext;
use phpunit_relay::paths::{PathReplacer, PathVariables};
use phpunit_relay::protocol::teamcity::escape;
use phpunit_relay::types::PathStyle;

/// Builder for `ExecutionContext` to simplify test setup.
pub struct ExecutionContextBuilder {
    context: ExecutionContext,
    home: String,
}

impl ExecutionContextBuilder {
    /// Context rooted at `cwd`, with POSIX paths and `/home/u` as home.
    pub fn new(cwd: &str) -> Self {
        Self {
            context: ExecutionContext {
                path_style: PathStyle::Posix,
                ..ExecutionContext::new(PathBuf::from(cwd))
            },
            home: "/home/u".to_string(),
        }
    }

    pub fn runtime(mut self, binary: &str) -> Self {
        self.context.runtime_binary = binary.to_string();
        self
    }

    pub fn framework(mut self, binary: &str) -> Self {
        self.context.framework_binary = binary.to_string();
        self
    }

    pub fn command(mut self, template: &str) -> Self {
        self.context.command_template = template.to_string();
        self
    }

    pub fn runtime_arg(mut self, arg: &str) -> Self {
        self.context.runtime_args.push(arg.to_string());
        self
    }

    pub fn extra_arg(mut self, arg: &str) -> Self {
        self.context.extra_args.push(arg.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.context
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn mapping(mut self, local: &str, remote: &str) -> Self {
        self.context
            .path_mappings
            .insert(local.to_string(), remote.to_string());
        self
    }

    pub fn home(mut self, home: &str) -> Self {
        self.home = home.to_string();
        self
    }

    pub fn style(mut self, style: PathStyle) -> Self {
        self.context.path_style = style;
        self
    }

    /// Context plus a replacer with fixed (host independent) variables.
    pub fn build(self) -> (ExecutionContext, PathReplacer) {
        let cwd = self.context.working_directory.to_string_lossy().into_owned();
        let variables = PathVariables::new(cwd.clone(), cwd, self.home, self.context.path_style);
        let replacer = PathReplacer::new(variables, &self.context.path_mappings);
        (self.context, replacer)
    }
}

/// Builder for one `##teamcity[...]` line.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    name: String,
    attributes: BTreeMap<&'static str, String>,
    order: Vec<&'static str>,
}

impl FrameBuilder {
    pub fn new(event: &str) -> Self {
        Self {
            name: event.to_string(),
            attributes: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn started(name: &str) -> Self {
        Self::new("testStarted").attr("name", name)
    }

    pub fn finished(name: &str) -> Self {
        Self::new("testFinished").attr("name", name)
    }

    pub fn failed(name: &str, message: &str) -> Self {
        Self::new("testFailed").attr("name", name).attr("message", message)
    }

    pub fn ignored(name: &str, message: &str) -> Self {
        Self::new("testIgnored").attr("name", name).attr("message", message)
    }

    pub fn suite_started(name: &str) -> Self {
        Self::new("testSuiteStarted").attr("name", name)
    }

    pub fn suite_finished(name: &str) -> Self {
        Self::new("testSuiteFinished").attr("name", name)
    }

    pub fn flow(self, flow_id: &str) -> Self {
        self.attr("flowId", flow_id)
    }

    pub fn location(self, hint: &str) -> Self {
        self.attr("locationHint", hint)
    }

    pub fn duration(self, ms: u64) -> Self {
        self.attr("duration", &ms.to_string())
    }

    /// Set an attribute; the value is escaped when rendered.
    pub fn attr(mut self, key: &'static str, value: &str) -> Self {
        if self.attributes.insert(key, value.to_string()).is_none() {
            self.order.push(key);
        }
        self
    }

    pub fn build(&self) -> String {
        let mut line = format!("##teamcity[{}", self.name);
        for key in &self.order {
            let value = &self.attributes[key];
            line.push_str(&format!(" {key}='{}'", escape(value)));
        }
        line.push(']');
        line
    }
}
