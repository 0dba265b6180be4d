// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The orchestrator of a production pass.
//!
//! [`Produce`] pulls one entry at a time from the active provider. Scalars
//! are forwarded to the active consumer as they are emitted; a container
//! start makes the orchestrator recurse, with the consumer deciding who
//! reads the container. The call stack mirrors the container nesting, which
//! is why the depth is bounded by [`Config::max_depth`].

use crate::config::Config;
use crate::entry::{
    EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput, EntryProvider, EntryValue,
    ProduceContext,
};
use crate::error::Error;
use log::trace;

/// Runs one production pass with the default configuration.
///
/// Returns the consumer's output, or the first error raised anywhere in the
/// pass. No partial output is returned.
///
/// # Examples
///
/// ```rust
/// use morphic_core::forms::json::{JsonConsumer, JsonProvider};
/// use morphic_core::produce::produce;
///
/// let text = produce(
///     Box::new(JsonProvider::new("{a: 1, b: [true, null]}")),
///     JsonConsumer::new(),
/// )
/// .unwrap();
/// assert_eq!(text, r#"{"a":1,"b":[true,null]}"#);
/// ```
pub fn produce<'a, C: EntryOutput>(
    provider: Box<dyn EntryProvider<'a> + 'a>,
    consumer: C,
) -> Result<C::Output, Error> {
    Produce::new(provider).run(consumer)
}

/// What the provider emitted in one step.
enum Signal<'a> {
    Entry,
    Start {
        name: Option<String>,
        named: bool,
        alt: Option<Box<dyn EntryProvider<'a> + 'a>>,
    },
    End,
}

pub struct Produce<'a> {
    providers: Vec<Box<dyn EntryProvider<'a> + 'a>>,
    context: ProduceContext,
    named: bool,
    depth: u32,
    max_depth: u32,
}

impl<'a> Produce<'a> {
    pub fn new(provider: Box<dyn EntryProvider<'a> + 'a>) -> Self {
        Self::with_config(provider, &Config::default())
    }

    pub fn with_config(provider: Box<dyn EntryProvider<'a> + 'a>, config: &Config) -> Self {
        Produce {
            providers: vec![provider],
            context: ProduceContext {
                nameless: None,
                max_depth: config.max_depth(),
            },
            named: false,
            depth: 0,
            max_depth: config.max_depth(),
        }
    }

    /// Sets the initial naming preference before the pass starts.
    pub fn nameless(mut self, nameless: Option<bool>) -> Self {
        self.context.nameless = nameless;
        self
    }

    pub fn run<C: EntryOutput>(mut self, mut consumer: C) -> Result<C::Output, Error> {
        self.process_container(&mut consumer)?;
        consumer.output()
    }

    fn process_container(&mut self, consumer: &mut dyn EntryConsumer) -> Result<(), Error> {
        loop {
            match self.step(consumer)? {
                Signal::Entry => {}
                Signal::End => return Ok(()),
                Signal::Start { name, named, alt } => {
                    self.enter(consumer, name.as_deref(), named, alt)?
                }
            }
        }
    }

    fn step(&mut self, consumer: &mut dyn EntryConsumer) -> Result<Signal<'a>, Error> {
        let want_name = self.named;
        let Some(provider) = self.providers.last_mut() else {
            return Err(Error::protocol("no active entry provider"));
        };
        let mut builder = StepBuilder {
            consumer,
            context: &mut self.context,
            named: want_name,
            signal: None,
        };
        let _entry = provider.next_entry(&mut builder, want_name)?;
        builder
            .signal
            .ok_or_else(|| Error::protocol("entry provider returned without emitting an entry"))
    }

    fn enter(
        &mut self,
        consumer: &mut dyn EntryConsumer,
        name: Option<&str>,
        named: bool,
        alt: Option<Box<dyn EntryProvider<'a> + 'a>>,
    ) -> Result<(), Error> {
        if self.depth >= self.max_depth {
            return Err(Error::depth_exceed(format!(
                "container nesting exceeds the limit of {}",
                self.max_depth
            )));
        }
        let substituted = match alt {
            Some(provider) => {
                self.providers.push(provider);
                true
            }
            None => false,
        };
        let outer_named = std::mem::replace(&mut self.named, named);
        self.depth += 1;
        trace!(
            "enter container {:?} (named: {}, depth: {})",
            name,
            named,
            self.depth
        );

        let mut enclosed = Enclosed {
            produce: self,
            consumed: false,
        };
        let mut result = consumer.consume_container(name, &mut enclosed, named);
        if result.is_ok() && !enclosed.consumed {
            // walk the ignored container to its end with the same provider
            result = enclosed.produce.process_container(&mut SkipAll);
        }

        trace!("leave container {:?} (depth: {})", name, self.depth);
        self.depth -= 1;
        self.named = outer_named;
        if substituted {
            self.providers.pop();
        }
        result
    }
}

/// Builder handed to the provider for a single step.
struct StepBuilder<'s, 'a> {
    consumer: &'s mut dyn EntryConsumer,
    context: &'s mut ProduceContext,
    named: bool,
    signal: Option<Signal<'a>>,
}

impl<'a> StepBuilder<'_, 'a> {
    fn claim(&mut self, signal: Signal<'a>) -> Result<(), Error> {
        if self.signal.is_some() {
            return Err(Error::protocol(
                "entry provider emitted more than one entry in a single step",
            ));
        }
        self.signal = Some(signal);
        Ok(())
    }

    /// Entries of positional containers carry no name.
    fn visible<'n>(&self, name: Option<&'n str>) -> Option<&'n str> {
        if self.named {
            name
        } else {
            None
        }
    }
}

impl<'a> EntryBuilder<'a> for StepBuilder<'_, 'a> {
    fn entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<Entry, Error> {
        self.claim(Signal::Entry)?;
        let name = self.visible(name);
        self.consumer.consume_entry(name, value)?;
        Ok(Entry::new())
    }

    fn null_entry(&mut self, name: Option<&str>) -> Result<Entry, Error> {
        self.claim(Signal::Entry)?;
        let name = self.visible(name);
        self.consumer.consume_null(name)?;
        Ok(Entry::new())
    }

    fn start_container(
        &mut self,
        name: Option<&str>,
        named: bool,
        alt: Option<Box<dyn EntryProvider<'a> + 'a>>,
    ) -> Result<Entry, Error> {
        let name = self.visible(name).map(str::to_owned);
        self.claim(Signal::Start { name, named, alt })?;
        Ok(Entry::new())
    }

    fn end_container(&mut self) -> Result<Entry, Error> {
        self.claim(Signal::End)?;
        Ok(Entry::new())
    }

    fn context(&mut self) -> &mut ProduceContext {
        self.context
    }
}

/// Handle given to a consumer for one nested container.
struct Enclosed<'p, 'a> {
    produce: &'p mut Produce<'a>,
    consumed: bool,
}

impl Enclosed<'_, '_> {
    fn claim(&mut self) -> Result<(), Error> {
        if self.consumed {
            return Err(Error::protocol("nested container was already consumed"));
        }
        self.consumed = true;
        Ok(())
    }
}

impl EnclosedEntries for Enclosed<'_, '_> {
    fn consume(&mut self, owner: &mut dyn EntryConsumer) -> Result<(), Error> {
        self.claim()?;
        self.produce.process_container(owner)
    }

    fn intercept(&mut self, other: &mut dyn EntryConsumer) -> Result<(), Error> {
        self.claim()?;
        let preference = self.produce.context.nameless;
        let result = self.produce.process_container(other);
        self.produce.context.nameless = preference;
        result
    }

    fn context(&mut self) -> &mut ProduceContext {
        &mut self.produce.context
    }
}

/// Consumer that discards everything, nested containers included.
pub struct SkipAll;

impl EntryConsumer for SkipAll {
    fn consume_entry(&mut self, _name: Option<&str>, _value: EntryValue<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn consume_null(&mut self, _name: Option<&str>) -> Result<(), Error> {
        Ok(())
    }

    fn consume_container(
        &mut self,
        _name: Option<&str>,
        _entries: &mut dyn EnclosedEntries,
        _named: bool,
    ) -> Result<(), Error> {
        Ok(())
    }
}

impl EntryOutput for SkipAll {
    type Output = ();

    fn output(self) -> Result<(), Error> {
        Ok(())
    }
}
