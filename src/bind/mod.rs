/*!
Argument binding engine.

A bindable type implements `ArgSet` and lists its properties through an
`ArgVisitor`:

  impl ArgSet for Deploy {
      fn visit_args(&mut self, v: &mut dyn ArgVisitor) {
          v.set(&mut self.conn);                                   // nested argument set
          v.leaf(&Arg::new("e|env", "target environment").required(), &mut self.env);
          v.leaf(&Arg::new("r|retries", "retry count"), &mut self.retries);
      }
  }

The engine walks that description three times per invocation:

  register   pre-order; nested sets first, then leaves; one OptionDefinition per leaf
  assign     post-order; a nested set is detached, fully bound, then written back
  validate   pre-order; the set itself, then each nested set

Leaves are keyed by their primary name, which is also the key the matcher
reports values under.
*/

pub mod slot;

use log::debug;

use crate::error::{ConversionError, DefinitionError, GrammarError};
use crate::option::{Matches, OptionDefinition, OptionSet};

pub use slot::Slot;

/// Declarative description of one leaf option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    prototype: String,
    description: String,
    required: bool,
}

impl Arg {
    /// `prototype` carries names only (`"o|output"`); the value terminator is
    /// derived from the bound field when the option is registered.
    pub fn new(prototype: impl Into<String>, description: impl Into<String>) -> Self {
        Arg {
            prototype: prototype.into(),
            description: description.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Primary name, the key values are matched under.
    pub fn key(&self) -> &str {
        let first = self.prototype.split('|').next().unwrap_or_default();
        first.split(['=', ':']).next().unwrap_or_default()
    }

    /// Build the option definition for a field currently holding `slot`.
    ///
    /// A required option whose field already differs from its type default
    /// counts as satisfied and is registered as optional.
    pub fn definition(&self, slot: &dyn Slot) -> Result<OptionDefinition, GrammarError> {
        let required = self.required && slot.is_type_default();
        let prototype = if slot.is_flag() {
            self.prototype.clone()
        } else if required {
            format!("{}=", self.prototype)
        } else {
            format!("{}:", self.prototype)
        };
        let description = if required {
            self.description.clone()
        } else {
            format!("{} default={}", self.description, slot.render())
        };
        OptionDefinition::new(&prototype, description)
    }
}

/// A type whose properties can be bound from command-line options.
pub trait ArgSet {
    /// Report every bindable property to `visitor`.
    fn visit_args(&mut self, visitor: &mut dyn ArgVisitor);

    /// Semantic checks run after binding. Every message is reported.
    fn validate(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Receives the properties of an `ArgSet`.
pub trait ArgVisitor {
    fn leaf(&mut self, arg: &Arg, slot: &mut dyn Slot);
    fn set(&mut self, slot: &mut dyn SetSlot);
}

/// Storage of a nested argument set on its host.
pub trait SetSlot {
    /// The current child, constructed and stored first when absent.
    fn child(&mut self) -> &mut dyn ArgSet;

    /// Detach the child, let `bind` populate it, then assign it back onto the host.
    fn rebind(
        &mut self,
        bind: &mut dyn FnMut(&mut dyn ArgSet) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError>;
}

/// Absent children are built with `T::default()`.
impl<T: ArgSet + Default> SetSlot for Option<T> {
    fn child(&mut self) -> &mut dyn ArgSet {
        self.get_or_insert_with(T::default)
    }

    fn rebind(
        &mut self,
        bind: &mut dyn FnMut(&mut dyn ArgSet) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError> {
        let mut child = self.take().unwrap_or_default();
        let result = bind(&mut child);
        *self = Some(child);
        result
    }
}

/// Always-present nested set with an optional host hook.
///
/// The hook runs after the populated child has been stored, so the host sees
/// the bound values rather than the defaults.
pub struct SetProperty<'a, T> {
    value: &'a mut T,
    on_assign: Option<Box<dyn FnMut(&T) + 'a>>,
}

impl<'a, T: ArgSet + Default> SetProperty<'a, T> {
    pub fn new(value: &'a mut T) -> Self {
        SetProperty {
            value,
            on_assign: None,
        }
    }

    pub fn on_assign(mut self, hook: impl FnMut(&T) + 'a) -> Self {
        self.on_assign = Some(Box::new(hook));
        self
    }
}

impl<T: ArgSet + Default> SetSlot for SetProperty<'_, T> {
    fn child(&mut self) -> &mut dyn ArgSet {
        &mut *self.value
    }

    fn rebind(
        &mut self,
        bind: &mut dyn FnMut(&mut dyn ArgSet) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError> {
        let mut child = std::mem::take(&mut *self.value);
        let result = bind(&mut child);
        *self.value = child;
        result?;
        if let Some(hook) = self.on_assign.as_mut() {
            hook(&*self.value);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    Sets,
    Leaves,
}

/* ---- register ---- */

struct Registrar<'o> {
    options: &'o mut OptionSet,
    pass: Pass,
    error: Option<DefinitionError>,
}

impl ArgVisitor for Registrar<'_> {
    fn leaf(&mut self, arg: &Arg, slot: &mut dyn Slot) {
        if self.pass != Pass::Leaves || self.error.is_some() {
            return;
        }
        let added = arg
            .definition(slot)
            .map_err(DefinitionError::from)
            .and_then(|def| {
                debug!("registering option `{}` ({})", def.shape(), slot.type_name());
                self.options.add(def)
            });
        if let Err(e) = added {
            self.error = Some(e);
        }
    }

    fn set(&mut self, slot: &mut dyn SetSlot) {
        if self.pass != Pass::Sets || self.error.is_some() {
            return;
        }
        if let Err(e) = register(slot.child(), self.options) {
            self.error = Some(e);
        }
    }
}

/// Register one option definition per leaf of `set` (nested sets first).
pub fn register<A: ArgSet + ?Sized>(
    set: &mut A,
    options: &mut OptionSet,
) -> Result<(), DefinitionError> {
    for pass in [Pass::Sets, Pass::Leaves] {
        let mut registrar = Registrar {
            options: &mut *options,
            pass,
            error: None,
        };
        set.visit_args(&mut registrar);
        if let Some(err) = registrar.error {
            return Err(err);
        }
    }
    Ok(())
}

/* ---- assign ---- */

struct Assigner<'m> {
    matches: &'m Matches,
    pass: Pass,
    error: Option<ConversionError>,
}

impl ArgVisitor for Assigner<'_> {
    fn leaf(&mut self, arg: &Arg, slot: &mut dyn Slot) {
        if self.pass != Pass::Leaves || self.error.is_some() {
            return;
        }
        let Some(values) = self.matches.values(arg.key()) else {
            return;
        };
        for value in values {
            if let Err(e) = slot.assign(arg.key(), value) {
                self.error = Some(e);
                return;
            }
        }
    }

    fn set(&mut self, slot: &mut dyn SetSlot) {
        if self.pass != Pass::Sets || self.error.is_some() {
            return;
        }
        let matches = self.matches;
        if let Err(e) = slot.rebind(&mut |child: &mut dyn ArgSet| assign(child, matches)) {
            self.error = Some(e);
        }
    }
}

/// Convert and store matched values onto `set` and its nested sets.
///
/// The first conversion failure aborts the walk.
pub fn assign<A: ArgSet + ?Sized>(set: &mut A, matches: &Matches) -> Result<(), ConversionError> {
    for pass in [Pass::Sets, Pass::Leaves] {
        let mut assigner = Assigner {
            matches,
            pass,
            error: None,
        };
        set.visit_args(&mut assigner);
        if let Some(err) = assigner.error {
            return Err(err);
        }
    }
    Ok(())
}

/* ---- validate ---- */

struct Validator<'e> {
    errors: &'e mut Vec<String>,
}

impl ArgVisitor for Validator<'_> {
    fn leaf(&mut self, _arg: &Arg, _slot: &mut dyn Slot) {}

    fn set(&mut self, slot: &mut dyn SetSlot) {
        self.errors.extend(validate(slot.child()));
    }
}

/// Collect validation errors from `set` and every nested set, in discovery order.
pub fn validate<A: ArgSet + ?Sized>(set: &mut A) -> Vec<String> {
    let mut errors = set.validate();
    set.visit_args(&mut Validator {
        errors: &mut errors,
    });
    errors
}
