use std::collections::HashMap;

use quick_xml::escape::escape;

use super::{
    RenderMode, TemplateEngine, TemplateFunction,
    context::XmlNode,
    syntax::{self, Cond, Expr, Node},
};
use crate::error::Error;

/// Reads a value from the context document: `ctx('identity/language@type')`.
const CONTEXT_FUNCTION: &str = "ctx";

/// The default [`TemplateEngine`].
///
/// Variables and functions persist across [`TemplateEngine::parse_str`]
/// calls, so one engine can render several documents from the same
/// bindings.
#[derive(Default)]
pub struct Templater {
    variables: HashMap<String, String>,
    functions: HashMap<(Option<String>, String), TemplateFunction>,
    nodes: Vec<Node>,
}

impl Templater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    fn render_with(&self, mode: RenderMode, context: Option<&XmlNode>) -> Result<String, Error> {
        let mut render = Render {
            templater: self,
            context,
            mode,
            locals: Vec::new(),
            out: String::new(),
        };
        render.nodes(&self.nodes)?;
        Ok(render.out)
    }
}

impl std::fmt::Debug for Templater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templater")
            .field("variables", &self.variables)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl TemplateEngine for Templater {
    fn define_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    fn register_function(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        function: TemplateFunction,
    ) {
        self.functions
            .insert((namespace.map(str::to_string), name.to_string()), function);
    }

    fn parse_str(&mut self, source: &str) -> Result<(), Error> {
        self.nodes = syntax::parse(source)?;
        Ok(())
    }

    fn render_generic(&self, context: Option<&XmlNode>) -> Result<String, Error> {
        self.render_with(RenderMode::Generic, context)
    }

    fn render_document(&self, context: Option<&XmlNode>) -> Result<String, Error> {
        self.render_with(RenderMode::Document, context)
    }
}

struct Render<'a> {
    templater: &'a Templater,
    context: Option<&'a XmlNode>,
    mode: RenderMode,
    locals: Vec<(String, String)>,
    out: String,
}

impl Render<'_> {
    fn nodes(&mut self, nodes: &[Node]) -> Result<(), Error> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Expr(expr) => {
                    let value = self.eval(expr)?;
                    self.write_value(&value);
                }
                Node::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    if self.test(cond)? {
                        self.nodes(then)?;
                    } else {
                        self.nodes(otherwise)?;
                    }
                }
                Node::For { var, list, body } => {
                    let items = self.eval(list)?;
                    for item in items.split_whitespace() {
                        self.locals.push((var.clone(), item.to_string()));
                        let result = self.nodes(body);
                        self.locals.pop();
                        result?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write_value(&mut self, value: &str) {
        let escaped = escape(value);
        match self.mode {
            RenderMode::Generic => self.out.push_str(&escaped),
            RenderMode::Document => {
                let odf = escaped
                    .replace('\n', "<text:line-break/>")
                    .replace('\t', "<text:tab/>");
                self.out.push_str(&odf);
            }
        }
    }

    /// Evaluates a condition. A bare undefined variable tests as empty, so
    /// `${if script}` works for documents rendered without a language tag.
    fn test(&self, cond: &Cond) -> Result<bool, Error> {
        Ok(match cond {
            Cond::Truthy(expr) => !self.eval_or_empty(expr)?.is_empty(),
            Cond::Not(expr) => self.eval_or_empty(expr)?.is_empty(),
            Cond::Eq(lhs, rhs) => self.eval(lhs)? == self.eval(rhs)?,
            Cond::Ne(lhs, rhs) => self.eval(lhs)? != self.eval(rhs)?,
        })
    }

    fn eval_or_empty(&self, expr: &Expr) -> Result<String, Error> {
        match expr {
            Expr::Var(name) => Ok(self.lookup(name).unwrap_or_default().to_string()),
            other => self.eval(other),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.locals
            .iter()
            .rev()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value.as_str())
            .or_else(|| self.templater.variable(name))
    }

    fn eval(&self, expr: &Expr) -> Result<String, Error> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Var(name) => self
                .lookup(name)
                .map(str::to_string)
                .ok_or_else(|| Error::TemplateBinding(format!("undefined variable `{}`", name))),
            Expr::Call {
                namespace,
                name,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(namespace.as_deref(), name, &args)
            }
        }
    }

    fn call(&self, namespace: Option<&str>, name: &str, args: &[String]) -> Result<String, Error> {
        let qualified = match namespace {
            Some(ns) => format!("{}:{}", ns, name),
            None => name.to_string(),
        };

        let key = (namespace.map(str::to_string), name.to_string());
        if let Some(function) = self.templater.functions.get(&key) {
            return function(args)
                .map_err(|message| Error::TemplateBinding(format!("{}: {}", qualified, message)));
        }

        if namespace.is_none() && name == CONTEXT_FUNCTION {
            let [path] = args else {
                return Err(Error::TemplateBinding(format!(
                    "{} takes exactly one path argument",
                    CONTEXT_FUNCTION
                )));
            };
            let context = self.context.ok_or_else(|| {
                Error::TemplateBinding(format!(
                    "{}('{}') used without a context document",
                    CONTEXT_FUNCTION, path
                ))
            })?;
            return Ok(context.lookup(path).unwrap_or_default());
        }

        Err(Error::TemplateBinding(format!(
            "unknown function `{}`",
            qualified
        )))
    }
}
