//! A small source and dispatcher for exercising the engine in unit tests.
//!
//! Grammar:
//! - `say <text>` logs `<name>: <text>`, result 1
//! - `value <n>` result n
//! - `fail <text>` command error
//! - `fork <n> run <cmd>` forks into n sources named `<name>#<i>`
//! - `drop run <cmd>` yields no sources
//! - `guard <max> run <cmd>` passes the source while the shared tick count is below max
//! - `return <n>` / `return fail` / `return run <cmd>`
//! - `function <id> [<key>=<value>,...]`

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use cascade_foundation::message::UNKNOWN_FUNCTION;
use cascade_foundation::{ArgRecord, CommandError, CommandResult, Message, Result};

use crate::action::{FallthroughTask, bind};
use crate::build::ContinuationCommand;
use crate::call::CallFunction;
use crate::callback::ResultCallback;
use crate::chain::{
    ChainModifiers, CommandChain, CommandDispatcher, CustomCommandExecutor, CustomModifierExecutor, Stage,
};
use crate::context::ExecutionControl;
use crate::function::CommandFunction;
use crate::source::ExecutionSource;

#[derive(Default)]
pub(crate) struct Shared {
    pub log: RefCell<Vec<String>>,
    pub failures: RefCell<Vec<String>>,
    pub ticks: Cell<usize>,
    pub functions: RefCell<HashMap<String, Rc<CommandFunction<TestSource>>>>,
}

#[derive(Clone)]
pub(crate) struct TestSource {
    pub name: Rc<str>,
    pub shared: Rc<Shared>,
    callback: ResultCallback,
    silent: bool,
}

impl TestSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            shared: Rc::new(Shared::default()),
            callback: ResultCallback::empty(),
            silent: false,
        }
    }

    pub fn renamed(&self, name: String) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn silenced(&self) -> Self {
        Self {
            silent: true,
            ..self.clone()
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.shared.log.borrow().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.shared.failures.borrow().clone()
    }

    pub fn define(&self, id: &str, lines: &[&str]) {
        let function = CommandFunction::from_lines(id, self, lines).unwrap();
        self.shared
            .functions
            .borrow_mut()
            .insert(id.to_string(), Rc::new(function));
    }

    pub fn function(&self, id: &str) -> Rc<CommandFunction<TestSource>> {
        Rc::clone(&self.shared.functions.borrow()[id])
    }
}

impl ExecutionSource for TestSource {
    fn has_permission(&self, _level: u8) -> bool {
        true
    }

    fn callback(&self) -> ResultCallback {
        self.callback.clone()
    }

    fn with_callback(&self, callback: ResultCallback) -> Self {
        Self {
            callback,
            ..self.clone()
        }
    }

    fn dispatcher(&self) -> Rc<dyn CommandDispatcher<Self>> {
        Rc::new(TestDispatcher)
    }

    fn send_failure(&self, error: &CommandError) {
        self.shared
            .failures
            .borrow_mut()
            .push(format!("{}: {error}", self.name));
    }

    fn is_silent(&self) -> bool {
        self.silent
    }
}

pub(crate) struct TestDispatcher;

fn number<T: std::str::FromStr>(input: &str, text: &str) -> CommandResult<T> {
    text.parse()
        .map_err(|_| CommandError::unknown_argument(input, input.len()))
}

fn split_run<'a>(input: &str, rest: &'a str) -> CommandResult<(&'a str, &'a str)> {
    rest.split_once(" run ")
        .ok_or_else(|| CommandError::unknown_command(input))
}

impl CommandDispatcher<TestSource> for TestDispatcher {
    fn resolve(&self, input: &str, source: &TestSource) -> CommandResult<Vec<Stage<TestSource>>> {
        let (head, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.to_string();
        let stage = Stage::new(input);
        match head {
            "say" => Ok(vec![stage.with_command(move |s: &TestSource| {
                s.shared.log.borrow_mut().push(format!("{}: {rest}", s.name));
                Ok(1)
            })]),
            "value" => {
                let n: i32 = number(input, &rest)?;
                Ok(vec![stage.with_command(move |_| Ok(n))])
            }
            "fail" => Ok(vec![stage.with_command(move |_| Err(CommandError::invalid(rest.clone())))]),
            "fork" => {
                let (count, tail) = split_run(input, &rest)?;
                let count: usize = number(input, count)?;
                let fork = Stage::new(input).forking().with_modifier(move |s: &TestSource| {
                    Ok((0..count).map(|i| s.renamed(format!("{}#{i}", s.name))).collect())
                });
                let mut stages = vec![fork];
                stages.extend(self.resolve(tail, source)?);
                Ok(stages)
            }
            "drop" => {
                let tail = rest
                    .strip_prefix("run ")
                    .ok_or_else(|| CommandError::unknown_command(input))?;
                let mut stages = vec![stage.with_modifier(|_| Ok(Vec::new()))];
                stages.extend(self.resolve(tail, source)?);
                Ok(stages)
            }
            "guard" => {
                let (max, tail) = split_run(input, &rest)?;
                let max: usize = number(input, max)?;
                let guard = stage.with_modifier(move |s: &TestSource| {
                    let ticks = s.shared.ticks.get();
                    if ticks < max {
                        s.shared.ticks.set(ticks + 1);
                        Ok(vec![s.clone()])
                    } else {
                        Ok(Vec::new())
                    }
                });
                let mut stages = vec![guard];
                stages.extend(self.resolve(tail, source)?);
                Ok(stages)
            }
            "return" => {
                if let Some(tail) = rest.strip_prefix("run ") {
                    let mut stages = vec![stage.with_custom_modifier(Rc::new(ReturnRun))];
                    stages.extend(self.resolve(tail, source)?);
                    Ok(stages)
                } else if rest == "fail" {
                    Ok(vec![stage.with_custom_command(Rc::new(ReturnValue(None)))])
                } else {
                    let n: i32 = number(input, &rest)?;
                    Ok(vec![stage.with_custom_command(Rc::new(ReturnValue(Some(n))))])
                }
            }
            "function" => {
                let (id, args) = match rest.split_once(' ') {
                    Some((id, args)) => (id.to_string(), Some(parse_args(args))),
                    None => (rest.clone(), None),
                };
                Ok(vec![stage.with_custom_command(Rc::new(CallNamed { id, args }))])
            }
            _ => Err(CommandError::unknown_command(input)),
        }
    }
}

fn parse_args(text: &str) -> ArgRecord {
    text.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

struct ReturnValue(Option<i32>);

impl CustomCommandExecutor<TestSource> for ReturnValue {
    fn run(
        &self,
        source: &TestSource,
        _chain: &CommandChain<TestSource>,
        _modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, TestSource>,
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

struct ReturnRun;

impl CustomModifierExecutor<TestSource> for ReturnRun {
    fn apply(
        &self,
        original: &TestSource,
        sources: &[TestSource],
        chain: &CommandChain<TestSource>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, TestSource>,
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

struct CallNamed {
    id: String,
    args: Option<ArgRecord>,
}

impl CustomCommandExecutor<TestSource> for CallNamed {
    fn run(
        &self,
        source: &TestSource,
        _chain: &CommandChain<TestSource>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, TestSource>,
    ) -> Result<()> {
        let function = source.shared.functions.borrow().get(&self.id).cloned();
        let Some(function) = function else {
            let error = CommandError::new(Message::translatable(UNKNOWN_FUNCTION, vec![self.id.clone()]));
            source.handle_error(&error, modifiers.is_forked(), control.tracer());
            return Ok(());
        };
        let body = match function.instantiate(self.args.as_ref()) {
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
