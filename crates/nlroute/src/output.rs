//! Structured output emission.
//!
//! The route printer drives one [`Emitter`] regardless of the output
//! format. In text mode only the `text` calls produce bytes; in JSON
//! mode only the structural calls and fields do, building a tree that
//! is serialized on [`Emitter::finish`]. The container/list/instance
//! bracketing is tracked (and validated) in both modes, so a printer
//! bug surfaces as [`Error::Output`] in text mode too instead of only
//! corrupting JSON.

use std::io::Write;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Output rendering format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// netstat-style columnar text.
    #[default]
    Text,
    /// JSON document.
    Json,
}

/// Output modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Wide output: extra next-hop id and MTU columns.
    pub wide: bool,
    /// Numeric output: never resolve addresses to names.
    pub numeric: bool,
    /// Pretty-print JSON.
    pub pretty: bool,
}

enum Node {
    Container(String, Map<String, Value>),
    List(String, Vec<Value>),
    Instance(Map<String, Value>),
}

impl Node {
    fn label(&self) -> &str {
        match self {
            Node::Container(name, _) => name,
            Node::List(name, _) => name,
            Node::Instance(_) => "(instance)",
        }
    }
}

/// Format-agnostic structured writer.
pub struct Emitter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    root: Map<String, Value>,
    stack: Vec<Node>,
}

impl<W: Write> Emitter<W> {
    /// Create an emitter for the given sink and format.
    pub fn new(writer: W, format: OutputFormat, options: OutputOptions) -> Self {
        Self {
            writer,
            format,
            pretty: options.pretty,
            root: Map::new(),
            stack: Vec::new(),
        }
    }

    /// Emit literal text (text mode only).
    pub fn text(&mut self, s: &str) -> Result<()> {
        if self.format == OutputFormat::Text {
            self.writer.write_all(s.as_bytes())?;
        }
        Ok(())
    }

    /// Open a named container (JSON object).
    pub fn open_container(&mut self, name: &str) {
        self.stack.push(Node::Container(name.to_string(), Map::new()));
    }

    /// Close the innermost container; its name must match.
    pub fn close_container(&mut self, name: &str) -> Result<()> {
        match self.stack.pop() {
            Some(Node::Container(open, map)) if open == name => {
                self.attach(open, Value::Object(map))
            }
            Some(node) => Err(Error::Output(format!(
                "close of container {name:?} but {:?} is open",
                node.label()
            ))),
            None => Err(Error::Output(format!(
                "close of container {name:?} with nothing open"
            ))),
        }
    }

    /// Open a named list (JSON array).
    pub fn open_list(&mut self, name: &str) {
        self.stack.push(Node::List(name.to_string(), Vec::new()));
    }

    /// Close the innermost list; its name must match.
    pub fn close_list(&mut self, name: &str) -> Result<()> {
        match self.stack.pop() {
            Some(Node::List(open, items)) if open == name => {
                self.attach(open, Value::Array(items))
            }
            Some(node) => Err(Error::Output(format!(
                "close of list {name:?} but {:?} is open",
                node.label()
            ))),
            None => Err(Error::Output(format!(
                "close of list {name:?} with nothing open"
            ))),
        }
    }

    /// Open an instance (one element) of the innermost list.
    pub fn open_instance(&mut self) -> Result<()> {
        match self.stack.last() {
            Some(Node::List(..)) => {
                self.stack.push(Node::Instance(Map::new()));
                Ok(())
            }
            _ => Err(Error::Output("instance opened outside a list".into())),
        }
    }

    /// Close the innermost instance.
    pub fn close_instance(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Node::Instance(map)) => match self.stack.last_mut() {
                Some(Node::List(_, items)) => {
                    items.push(Value::Object(map));
                    Ok(())
                }
                _ => Err(Error::Output("instance closed outside a list".into())),
            },
            Some(node) => Err(Error::Output(format!(
                "close of instance but {:?} is open",
                node.label()
            ))),
            None => Err(Error::Output("close of instance with nothing open".into())),
        }
    }

    fn attach(&mut self, name: String, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            Some(Node::Container(_, map)) | Some(Node::Instance(map)) => {
                map.insert(name, value);
                Ok(())
            }
            Some(Node::List(..)) => Err(Error::Output(format!(
                "named node {name:?} directly inside a list"
            ))),
            None => {
                self.root.insert(name, value);
                Ok(())
            }
        }
    }

    /// Emit a field (JSON mode only, but validated in both).
    pub fn field(&mut self, key: &str, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            Some(Node::Container(_, map)) | Some(Node::Instance(map)) => {
                if self.format == OutputFormat::Json {
                    map.insert(key.to_string(), value);
                }
                Ok(())
            }
            _ => Err(Error::Output(format!(
                "field {key:?} outside a container or instance"
            ))),
        }
    }

    /// Emit a string field.
    pub fn field_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.field(key, Value::String(value.to_string()))
    }

    /// Emit an unsigned integer field.
    pub fn field_u32(&mut self, key: &str, value: u32) -> Result<()> {
        self.field(key, Value::from(value))
    }

    /// Validate that everything is closed and flush the document.
    pub fn finish(mut self) -> Result<()> {
        if let Some(node) = self.stack.last() {
            return Err(Error::Output(format!(
                "finish with {:?} still open",
                node.label()
            )));
        }
        if self.format == OutputFormat::Json {
            let root = Value::Object(std::mem::take(&mut self.root));
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &root)
                    .map_err(|e| Error::Output(e.to_string()))?;
            } else {
                serde_json::to_writer(&mut self.writer, &root)
                    .map_err(|e| Error::Output(e.to_string()))?;
            }
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
