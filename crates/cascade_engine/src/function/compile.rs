//! Compilation of function source text.

use std::rc::Rc;

use cascade_foundation::{Error, ErrorContext, ErrorKind, LinePrefixHint, Result};

use super::macros::{MacroEntry, MacroFunction};
use super::template::StringTemplate;
use super::{CommandFunction, FunctionId, InstantiatedFunction};
use crate::build::UnboundCommand;
use crate::chain::parse_command;
use crate::source::ExecutionSource;

/// Longest logical line, in characters, a function may contain.
pub const MAX_COMMAND_LENGTH: usize = 2_000_000;

const EXCERPT_LENGTH: usize = 512;

pub(super) fn compile<S, L>(id: FunctionId, source: &S, lines: &[L]) -> Result<CommandFunction<S>>
where
    S: ExecutionSource,
    L: AsRef<str>,
{
    let dispatcher = source.dispatcher();
    let located = |kind: ErrorKind, line: usize| {
        Error::new(kind).with_context(ErrorContext::new().with_source(id.as_str()).with_line(line))
    };

    let mut builder = FunctionBuilder::default();
    let mut index = 0;
    while index < lines.len() {
        let line_number = index + 1;
        let mut line = lines[index].as_ref().trim().to_string();
        while line.ends_with('\\') {
            index += 1;
            let Some(next) = lines.get(index) else {
                return Err(located(
                    ErrorKind::LineContinuationAtEnd { line: line_number },
                    line_number,
                ));
            };
            line.pop();
            line.push_str(next.as_ref().trim());
            check_length(&line)?;
        }
        check_length(&line)?;
        index += 1;

        match line.chars().next() {
            None | Some('#') => {}
            Some('/') => return Err(located(slash_error(&line, line_number), line_number)),
            Some('$') => {
                let text = &line[1..];
                let template = StringTemplate::parse(text).map_err(|reason| {
                    located(
                        ErrorKind::MacroLine {
                            line: line_number,
                            text: text.to_string(),
                            reason: reason.to_string(),
                        },
                        line_number,
                    )
                })?;
                builder.add_macro(template, line_number);
            }
            Some(_) => {
                let parsed = parse_command(dispatcher.as_ref(), source, &line).map_err(|err| {
                    located(
                        ErrorKind::LineParse {
                            line: line_number,
                            message: err.to_string(),
                        },
                        line_number,
                    )
                })?;
                builder.add_command(Rc::new(UnboundCommand::new(parsed.chain().clone())));
            }
        }
    }

    Ok(builder.build(id, source))
}

pub(super) fn check_length(line: &str) -> Result<()> {
    // Byte length bounds the character count from above.
    if line.len() <= MAX_COMMAND_LENGTH {
        return Ok(());
    }
    let length = line.chars().count();
    if length <= MAX_COMMAND_LENGTH {
        return Ok(());
    }
    Err(Error::new(ErrorKind::CommandTooLong {
        length,
        excerpt: line.chars().take(EXCERPT_LENGTH).collect(),
    }))
}

fn slash_error(line: &str, line_number: usize) -> ErrorKind {
    let rest = &line[1..];
    let hint = if rest.starts_with('/') {
        LinePrefixHint::Comment
    } else {
        let name: String = rest
            .chars()
            .take_while(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
            .collect();
        LinePrefixHint::LeadingSlash(name)
    };
    ErrorKind::InvalidLinePrefix {
        command: line.to_string(),
        line: line_number,
        hint,
    }
}

struct FunctionBuilder<S: ExecutionSource> {
    plain: Vec<Rc<UnboundCommand<S>>>,
    macro_entries: Option<Vec<MacroEntry<S>>>,
    parameters: Vec<String>,
}

impl<S: ExecutionSource> Default for FunctionBuilder<S> {
    fn default() -> Self {
        Self {
            plain: Vec::new(),
            macro_entries: None,
            parameters: Vec::new(),
        }
    }
}

impl<S: ExecutionSource> FunctionBuilder<S> {
    fn add_command(&mut self, command: Rc<UnboundCommand<S>>) {
        match &mut self.macro_entries {
            Some(entries) => entries.push(MacroEntry::Plain(command)),
            None => self.plain.push(command),
        }
    }

    fn add_macro(&mut self, template: StringTemplate, line: usize) {
        let slots = template
            .variables()
            .iter()
            .map(|name| self.slot_for(name))
            .collect();
        let plain = &mut self.plain;
        let entries = self
            .macro_entries
            .get_or_insert_with(|| plain.drain(..).map(MacroEntry::Plain).collect());
        entries.push(MacroEntry::Template {
            template,
            slots,
            line,
        });
    }

    fn slot_for(&mut self, name: &str) -> usize {
        if let Some(slot) = self.parameters.iter().position(|p| p == name) {
            return slot;
        }
        self.parameters.push(name.to_string());
        self.parameters.len() - 1
    }

    fn build(self, id: FunctionId, source: &S) -> CommandFunction<S> {
        match self.macro_entries {
            None => CommandFunction::Plain(Rc::new(InstantiatedFunction::new(id, self.plain))),
            Some(entries) => CommandFunction::Macro(MacroFunction::new(
                id,
                entries,
                self.parameters,
                source.clone(),
            )),
        }
    }
}
