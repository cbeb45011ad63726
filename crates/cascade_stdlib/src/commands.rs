//! The standard command set.
//!
//! | Command | Result |
//! |---------|--------|
//! | `say <text>` | 1 |
//! | `counter add <name> <n>` / `counter set <name> <n>` / `counter get <name>` | counter value |
//! | `fail <text>` | always fails |
//! | `execute <subcommand>... run <command>` | result of `<command>` per source |
//! | `return <n>` / `return fail` / `return run <command>` | ends the current function |
//! | `function <id> [<arguments>]` | runs a function |
//! | `trigger <id>` | runs a function in an isolated frame |
//!
//! `execute` subcommands are `as <a>,<b>,...` (forks one source per name),
//! `if counter <name> <min>` and `unless counter <name> <min>` (filter), and
//! `silent` (suppresses failures). A trailing condition with no `run` is a
//! test: result 1 when it passes, a failure otherwise.
//!
//! `execute`, `function`, and `trigger` require permission level 2.

use std::rc::Rc;

use cascade_engine::{
    CallFunction, ChainModifiers, CommandChain, CommandDispatcher, ContinuationCommand, CustomCommandExecutor,
    CustomModifierExecutor, ExecutionControl, ExecutionSource, FallthroughTask, Stage, bind,
};
use cascade_foundation::message::UNKNOWN_FUNCTION;
use cascade_foundation::{ArgRecord, CommandError, CommandResult, Message, Result};

use crate::library::normalize_id;
use crate::reader::Reader;
use crate::snbt::parse_compound;
use crate::source::ScriptSource;

/// Permission level needed for `execute`, `function`, and `trigger`.
pub const GAMEMASTER_LEVEL: u8 = 2;

/// Resolves the standard command set.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDispatcher;

impl CommandDispatcher<ScriptSource> for StandardDispatcher {
    fn resolve(&self, input: &str, source: &ScriptSource) -> CommandResult<Vec<Stage<ScriptSource>>> {
        let mut reader = Reader::new(input);
        let mut stages = Vec::new();
        read_command(&mut reader, source, &mut stages)?;
        Ok(stages)
    }
}

fn require(source: &ScriptSource, reader: &Reader<'_>) -> CommandResult<()> {
    if source.has_permission(GAMEMASTER_LEVEL) {
        Ok(())
    } else {
        Err(reader.incomplete())
    }
}

fn expect_end(reader: &Reader<'_>) -> CommandResult<()> {
    if reader.is_at_end() {
        Ok(())
    } else {
        Err(reader.invalid())
    }
}

fn read_command(
    reader: &mut Reader<'_>,
    source: &ScriptSource,
    stages: &mut Vec<Stage<ScriptSource>>,
) -> CommandResult<()> {
    let start = reader.position();
    let stage = Stage::new(reader.rest());
    match reader.expect_word()? {
        "say" => {
            let text = reader.read_remaining().to_string();
            if text.is_empty() {
                return Err(reader.incomplete());
            }
            stages.push(stage.with_command(move |s: &ScriptSource| {
                s.say(&text);
                Ok(1)
            }));
        }
        "counter" => stages.push(read_counter(reader, stage)?),
        "fail" => {
            let text = reader.read_remaining().to_string();
            stages.push(stage.with_command(move |_| Err(CommandError::invalid(text.clone()))));
        }
        "execute" => {
            require(source, reader)?;
            read_execute(reader, source, stages)?;
        }
        "return" => {
            if reader.eat_keyword("run") {
                stages.push(stage.with_custom_modifier(Rc::new(ReturnRun)));
                read_command(reader, source, stages)?;
            } else if reader.eat_keyword("fail") {
                expect_end(reader)?;
                stages.push(stage.with_custom_command(Rc::new(ReturnValue(None))));
            } else {
                let value: i32 = reader.read_number()?;
                expect_end(reader)?;
                stages.push(stage.with_custom_command(Rc::new(ReturnValue(Some(value)))));
            }
        }
        "function" => {
            require(source, reader)?;
            let id = normalize_id(reader.expect_word()?);
            let arguments = if reader.is_at_end() {
                None
            } else {
                let record = parse_compound(reader)?;
                reader.skip_whitespace();
                expect_end(reader)?;
                Some(record)
            };
            stages.push(stage.with_custom_command(Rc::new(RunFunction { id, arguments })));
        }
        "trigger" => {
            require(source, reader)?;
            let id = normalize_id(reader.expect_word()?);
            expect_end(reader)?;
            stages.push(stage.with_custom_command(Rc::new(Trigger { id })));
        }
        _ => return Err(reader.invalid_at(start)),
    }
    Ok(())
}

fn read_counter(reader: &mut Reader<'_>, stage: Stage<ScriptSource>) -> CommandResult<Stage<ScriptSource>> {
    let start = reader.position();
    let action = reader.expect_word()?;
    let name = reader.expect_word()?.to_string();
    let stage = match action {
        "get" => stage.with_command(move |s: &ScriptSource| Ok(s.host().counter(&name))),
        "add" => {
            let delta: i32 = reader.read_number()?;
            stage.with_command(move |s: &ScriptSource| Ok(s.host().add_counter(&name, delta)))
        }
        "set" => {
            let value: i32 = reader.read_number()?;
            stage.with_command(move |s: &ScriptSource| {
                s.host().set_counter(&name, value);
                Ok(value)
            })
        }
        _ => return Err(reader.invalid_at(start)),
    };
    expect_end(reader)?;
    Ok(stage)
}

fn read_execute(
    reader: &mut Reader<'_>,
    source: &ScriptSource,
    stages: &mut Vec<Stage<ScriptSource>>,
) -> CommandResult<()> {
    loop {
        let start = reader.position();
        let rest = reader.rest();
        match reader.expect_word()? {
            "run" => return read_command(reader, source, stages),
            "as" => {
                let names: Vec<Rc<str>> = reader
                    .expect_word()?
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(Rc::from)
                    .collect();
                if names.is_empty() {
                    return Err(reader.invalid());
                }
                let text = &rest[..reader.position() - start];
                stages.push(Stage::new(text.trim_end()).forking().with_modifier(move |s: &ScriptSource| {
                    Ok(names.iter().map(|name| s.with_name(name)).collect())
                }));
            }
            "silent" => {
                let text = &rest[..reader.position() - start];
                stages.push(Stage::new(text.trim_end()).with_modifier(|s: &ScriptSource| Ok(vec![s.silenced()])));
            }
            word @ ("if" | "unless") => {
                let expected = word == "if";
                if !reader.eat_keyword("counter") {
                    return Err(reader.invalid());
                }
                let name = reader.expect_word()?.to_string();
                let min: i32 = reader.read_number()?;
                let passes = move |s: &ScriptSource| (s.host().counter(&name) >= min) == expected;
                let text = rest[..reader.position() - start].trim_end();

                if reader.is_at_end() {
                    stages.push(Stage::new(text).with_command(move |s: &ScriptSource| {
                        if passes(s) {
                            Ok(1)
                        } else {
                            Err(CommandError::invalid("Test failed"))
                        }
                    }));
                    return Ok(());
                }
                stages.push(Stage::new(text).with_modifier(move |s: &ScriptSource| {
                    Ok(if passes(s) { vec![s.clone()] } else { Vec::new() })
                }));
            }
            _ => return Err(reader.invalid_at(start)),
        }
    }
}

// =============================================================================
// Executors
// =============================================================================

/// `return <n>` and `return fail`: ends the current frame.
struct ReturnValue(Option<i32>);

impl CustomCommandExecutor<ScriptSource> for ReturnValue {
    fn run(
        &self,
        source: &ScriptSource,
        _chain: &CommandChain<ScriptSource>,
        _modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, ScriptSource>,
    ) -> Result<()> {
        match self.0 {
            Some(value) => {
                source.callback().on_success(value);
                control.current_frame().return_success(value);
            }
            None => {
                source.callback().on_failure();
                control.current_frame().return_failure();
            }
        }
        Ok(())
    }
}

/// `return run`: drops the rest of the frame and runs the tail for its result.
struct ReturnRun;

impl CustomModifierExecutor<ScriptSource> for ReturnRun {
    fn apply(
        &self,
        original: &ScriptSource,
        sources: &[ScriptSource],
        chain: &CommandChain<ScriptSource>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, ScriptSource>,
    ) -> Result<()> {
        if sources.is_empty() {
            if modifiers.is_return() {
                control.queue_next(Box::new(FallthroughTask));
            }
            return Ok(());
        }
        control.current_frame().discard();
        control.queue_next(Box::new(ContinuationCommand::new(
            chain.next_stage(),
            original.clone(),
            sources.to_vec(),
            modifiers.set_return(),
        )));
        Ok(())
    }
}

fn unknown_function(id: &str) -> CommandError {
    CommandError::new(Message::translatable(UNKNOWN_FUNCTION, vec![id.to_string()]))
}

/// `function <id> [<arguments>]`.
struct RunFunction {
    id: String,
    arguments: Option<ArgRecord>,
}

impl CustomCommandExecutor<ScriptSource> for RunFunction {
    fn run(
        &self,
        source: &ScriptSource,
        _chain: &CommandChain<ScriptSource>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, ScriptSource>,
    ) -> Result<()> {
        let body = source
            .host()
            .function(&self.id)
            .ok_or_else(|| unknown_function(&self.id))
            .and_then(|function| function.instantiate(self.arguments.as_ref()));
        let body = match body {
            Ok(body) => body,
            Err(error) => {
                source.handle_error(&error, modifiers.is_forked(), control.tracer());
                return Ok(());
            }
        };

        let call = if modifiers.is_return() {
            let callback = control.current_frame().return_callback().clone();
            CallFunction::new(body, callback, true)
        } else {
            CallFunction::new(body, source.callback(), false)
        };
        control.queue_next(bind(Rc::new(call), source.clone()));
        Ok(())
    }
}

/// `trigger <id>`: runs the function as if activated from outside.
struct Trigger {
    id: String,
}

impl CustomCommandExecutor<ScriptSource> for Trigger {
    fn run(
        &self,
        source: &ScriptSource,
        _chain: &CommandChain<ScriptSource>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, ScriptSource>,
    ) -> Result<()> {
        let body = source
            .host()
            .function(&self.id)
            .ok_or_else(|| unknown_function(&self.id))
            .and_then(|function| function.instantiate(None));
        let body = match body {
            Ok(body) => body,
            Err(error) => {
                source.handle_error(&error, modifiers.is_forked(), control.tracer());
                return Ok(());
            }
        };

        let activator = source.clone();
        control.queue_isolated(
            Box::new(move |control: &mut ExecutionControl<'_, ScriptSource>| {
                let callback = control.current_frame().return_callback().clone();
                control.queue_next(bind(Rc::new(CallFunction::new(body, callback, true)), activator));
                Ok(())
            }),
            source.callback(),
        );
        Ok(())
    }
}
