//! Tree-walking evaluator.
//!
//! Every node visited and every callback invocation costs one step. Values
//! copied out of scope or produced by built-ins are charged by size: one step
//! per array element or object entry plus one per [`BYTES_PER_STEP`] bytes of
//! string. Charged values and literals nested deeper than
//! [`TransformLimits::max_depth`] are rejected.
//!
//! Bound values are shared behind `Rc`, and member chains such as
//! `response.items[0].name` are walked by reference so only the value at the
//! end of the chain is copied.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::rc::Rc;

use serde_json::{Map, Value};

use super::ast::{Arrow, BinaryOp, Element, Expr, LogicalOp, Property, TemplatePart, UnaryOp};
use super::builtins::{
    array_method, call_global, flatten, get_property, is_global_function, namespace_constant,
    number_method, object_method, property_ref, string_method, NAMESPACES,
};
use super::value::{
    add, compare, format_number, loose_equals, number_value, property_key, strict_equals,
    to_js_string, to_number, truthy, type_of,
};
use super::{TransformError, TransformLimits};

/// Longest string an expression may build.
const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// String bytes covered by one step.
pub const BYTES_PER_STEP: u64 = 256;

/// Array methods whose first argument is a callback.
const CALLBACK_METHODS: &[&str] = &[
    "map", "filter", "find", "findIndex", "some", "every", "reduce", "sort", "flatMap", "forEach",
];

/// Something that can be invoked with values: an arrow function literal or a
/// built-in passed by name, as in `.map(Number)`.
enum Callable<'e> {
    Arrow(&'e Arrow),
    Global(String),
}

/// One link of a member chain, outermost last.
enum Link<'e> {
    Field(&'e str, bool),
    Index(&'e Expr, bool),
}

pub struct Evaluator {
    scopes: Vec<(String, Rc<Value>)>,
    steps: u64,
    max_steps: u64,
    max_depth: usize,
}

impl Evaluator {
    pub fn new(response: Value, limits: &TransformLimits) -> Self {
        Self {
            scopes: vec![("response".to_string(), Rc::new(response))],
            steps: 0,
            max_steps: limits.max_steps,
            max_depth: limits.max_depth,
        }
    }

    pub fn run(mut self, expr: &Expr) -> Result<Value, TransformError> {
        self.eval(expr)
    }

    fn tick(&mut self, cost: u64) -> Result<(), TransformError> {
        self.steps = self.steps.saturating_add(cost);
        if self.steps > self.max_steps {
            return Err(TransformError::StepLimit {
                limit: self.max_steps,
            });
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Rc<Value>> {
        self.scopes
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    fn is_bound(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Name of an unshadowed global namespace, e.g. `Math`.
    fn namespace<'e>(&self, expr: &'e Expr) -> Option<&'e str> {
        match expr {
            Expr::Ident(name) if NAMESPACES.contains(&name.as_str()) && !self.is_bound(name) => {
                Some(name)
            }
            _ => None,
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, TransformError> {
        Ok(self.eval_chain(expr)?.unwrap_or(Value::Null))
    }

    /// Evaluate, returning `None` when an optional chain short-circuits.
    fn eval_chain(&mut self, expr: &Expr) -> Result<Option<Value>, TransformError> {
        self.tick(1)?;
        if let Some((root, links)) = self.chain(expr) {
            return self.read_chain(&root, &links);
        }
        let value = match expr {
            Expr::Literal(value) => value.clone(),
            Expr::Template(parts) => {
                let value = self.template(parts)?;
                self.charge(&value)?;
                value
            }
            Expr::Ident(name) => self.identifier(name)?,
            Expr::Array(elements) => {
                let value = Value::Array(self.elements(elements)?);
                self.weight(&value)?;
                value
            }
            Expr::Object(properties) => {
                let value = self.object(properties)?;
                self.weight(&value)?;
                value
            }
            Expr::Member {
                object,
                property,
                optional,
            } => {
                if let Some(ns) = self.namespace(object) {
                    return Ok(Some(namespace_constant(ns, property).unwrap_or(Value::Null)));
                }
                let Some(target) = self.eval_chain(object)? else {
                    return Ok(None);
                };
                if target.is_null() {
                    if *optional {
                        return Ok(None);
                    }
                    return Err(read_of_null(property));
                }
                get_property(&target, &Value::String(property.clone()))
            }
            Expr::Index {
                object,
                index,
                optional,
            } => {
                let Some(target) = self.eval_chain(object)? else {
                    return Ok(None);
                };
                if target.is_null() && *optional {
                    return Ok(None);
                }
                let key = self.eval(index)?;
                if target.is_null() {
                    return Err(read_of_null(&property_key(&key)));
                }
                get_property(&target, &key)
            }
            Expr::Call {
                callee,
                args,
                optional,
            } => return self.call(callee, args, *optional),
            Expr::Unary { op, operand } => self.unary(*op, operand)?,
            Expr::Binary { op, left, right } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                let value = binary(*op, &l, &r);
                self.charge(&value)?;
                value
            }
            Expr::Logical { op, left, right } => {
                let l = self.eval(left)?;
                let short_circuit = match op {
                    LogicalOp::And => !truthy(&l),
                    LogicalOp::Or => truthy(&l),
                    LogicalOp::Nullish => !l.is_null(),
                };
                if short_circuit {
                    l
                } else {
                    self.eval(right)?
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if truthy(&self.eval(test)?) {
                    self.eval(consequent)?
                } else {
                    self.eval(alternate)?
                }
            }
            Expr::Arrow(_) => {
                return Err(TransformError::runtime(
                    "TypeError: arrow functions can only be passed as callbacks",
                ))
            }
        };
        Ok(Some(value))
    }

    /// Split a member chain rooted at a bound name into its root and links.
    fn chain<'e>(&self, expr: &'e Expr) -> Option<(Rc<Value>, Vec<Link<'e>>)> {
        let mut links = Vec::new();
        let mut node = expr;
        loop {
            match node {
                Expr::Member {
                    object,
                    property,
                    optional,
                } => {
                    links.push(Link::Field(property.as_str(), *optional));
                    node = &**object;
                }
                Expr::Index {
                    object,
                    index,
                    optional,
                } => {
                    links.push(Link::Index(&**index, *optional));
                    node = &**object;
                }
                Expr::Ident(name) => {
                    let root = Rc::clone(self.lookup(name)?);
                    links.reverse();
                    return Some((root, links));
                }
                _ => return None,
            }
        }
    }

    /// Follow `links` from `root` by reference, copying only the final value.
    fn read_chain(
        &mut self,
        root: &Value,
        links: &[Link<'_>],
    ) -> Result<Option<Value>, TransformError> {
        let mut cursor = Cow::Borrowed(root);
        for link in links {
            self.tick(1)?;
            let key = match link {
                Link::Field(property, optional) => {
                    if cursor.is_null() {
                        if *optional {
                            return Ok(None);
                        }
                        return Err(read_of_null(property));
                    }
                    Value::String(property.to_string())
                }
                Link::Index(index, optional) => {
                    if cursor.is_null() && *optional {
                        return Ok(None);
                    }
                    let key = self.eval(index)?;
                    if cursor.is_null() {
                        return Err(read_of_null(&property_key(&key)));
                    }
                    key
                }
            };
            cursor = match cursor {
                Cow::Borrowed(value) => match property_ref(value, &key) {
                    Some(child) => Cow::Borrowed(child),
                    None => Cow::Owned(get_property(value, &key)),
                },
                Cow::Owned(value) => Cow::Owned(get_property(&value, &key)),
            };
        }
        let value = cursor.into_owned();
        self.charge(&value)?;
        Ok(Some(value))
    }

    fn identifier(&self, name: &str) -> Result<Value, TransformError> {
        if let Some(value) = self.lookup(name) {
            return Ok(Value::clone(value));
        }
        if NAMESPACES.contains(&name) || is_global_function(name) {
            return Err(TransformError::runtime(format!(
                "TypeError: {name} cannot be used as a value"
            )));
        }
        Err(TransformError::runtime(format!(
            "ReferenceError: {name} is not defined"
        )))
    }

    fn template(&mut self, parts: &[TemplatePart]) -> Result<Value, TransformError> {
        let mut out = String::new();
        for part in parts {
            match part {
                TemplatePart::Text(text) => out.push_str(text),
                TemplatePart::Expr(expr) => out.push_str(&to_js_string(&self.eval(expr)?)),
            }
            check_string_len(out.len())?;
        }
        Ok(Value::String(out))
    }

    fn elements(&mut self, elements: &[Element]) -> Result<Vec<Value>, TransformError> {
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Item(expr) => out.push(self.eval(expr)?),
                Element::Spread(expr) => {
                    let spread = self.eval(expr)?;
                    match spread {
                        Value::Array(items) => {
                            self.tick(items.len() as u64)?;
                            out.extend(items);
                        }
                        Value::String(s) => {
                            self.tick(s.len() as u64)?;
                            out.extend(s.chars().map(|c| Value::String(c.to_string())));
                        }
                        other => {
                            return Err(TransformError::runtime(format!(
                                "TypeError: {} is not iterable",
                                to_js_string(&other)
                            )))
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    fn object(&mut self, properties: &[Property]) -> Result<Value, TransformError> {
        let mut out = Map::new();
        for property in properties {
            match property {
                Property::Named(key, expr) => {
                    let value = self.eval(expr)?;
                    out.insert(key.clone(), value);
                }
                Property::Computed(key, expr) => {
                    let key = property_key(&self.eval(key)?);
                    let value = self.eval(expr)?;
                    out.insert(key, value);
                }
                Property::Spread(expr) => match self.eval(expr)? {
                    Value::Object(map) => {
                        self.tick(map.len() as u64)?;
                        out.extend(map);
                    }
                    Value::Array(items) => {
                        self.tick(items.len() as u64)?;
                        out.extend(items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)));
                    }
                    Value::String(s) => {
                        self.tick(s.len() as u64)?;
                        out.extend(
                            s.chars()
                                .enumerate()
                                .map(|(i, c)| (i.to_string(), Value::String(c.to_string()))),
                        );
                    }
                    // Spreading primitives or null contributes nothing.
                    _ => {}
                },
            }
        }
        Ok(Value::Object(out))
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, TransformError> {
        if op == UnaryOp::TypeOf {
            if let Expr::Ident(name) = operand {
                if !self.is_bound(name) {
                    let kind = if is_global_function(name) {
                        "function"
                    } else if NAMESPACES.contains(&name.as_str()) {
                        "object"
                    } else {
                        "undefined"
                    };
                    return Ok(Value::String(kind.into()));
                }
            }
        }
        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!truthy(&value)),
            UnaryOp::Neg => number_value(-to_number(&value)),
            UnaryOp::Plus => number_value(to_number(&value)),
            UnaryOp::TypeOf => Value::String(type_of(&value).into()),
        })
    }

    fn call(
        &mut self,
        callee: &Expr,
        args: &[Element],
        optional: bool,
    ) -> Result<Option<Value>, TransformError> {
        match callee {
            Expr::Ident(name) if !self.is_bound(name) => {
                if is_global_function(name) {
                    let args = self.elements(args)?;
                    return self.global(name, &args).map(Some);
                }
                self.identifier(name).map(Some)
            }
            Expr::Member {
                object, property, ..
            } if self.namespace(object).is_some() => {
                let path = format!("{}.{property}", describe(object));
                if !is_global_function(&path) {
                    return Err(not_a_function(&path));
                }
                let args = self.elements(args)?;
                self.global(&path, &args).map(Some)
            }
            Expr::Member {
                object,
                property,
                optional: member_optional,
            } => {
                let Some(receiver) = self.eval_chain(object)? else {
                    return Ok(None);
                };
                if receiver.is_null() && *member_optional {
                    return Ok(None);
                }
                self.method(callee, receiver, property, args, optional)
            }
            Expr::Index {
                object,
                index,
                optional: member_optional,
            } => {
                let Some(receiver) = self.eval_chain(object)? else {
                    return Ok(None);
                };
                if receiver.is_null() && *member_optional {
                    return Ok(None);
                }
                let name = property_key(&self.eval(index)?);
                self.method(callee, receiver, &name, args, optional)
            }
            other => {
                let Some(value) = self.eval_chain(other)? else {
                    return Ok(None);
                };
                if value.is_null() && optional {
                    return Ok(None);
                }
                Err(not_a_function(&describe(other)))
            }
        }
    }

    fn global(&mut self, path: &str, args: &[Value]) -> Result<Value, TransformError> {
        let result = call_global(path, args)?;
        self.charge(&result)?;
        Ok(result)
    }

    fn method(
        &mut self,
        callee: &Expr,
        receiver: Value,
        name: &str,
        args: &[Element],
        optional: bool,
    ) -> Result<Option<Value>, TransformError> {
        if receiver.is_null() {
            return Err(read_of_null(name));
        }
        let receiver = match receiver {
            Value::Array(items) if CALLBACK_METHODS.contains(&name) => {
                return self.callback_method(items, name, args).map(Some);
            }
            other => other,
        };
        let values = self.elements(args)?;
        let result = match &receiver {
            Value::Array(items) => array_method(items, name, &values)?,
            Value::String(s) => string_method(s, name, &values)?,
            Value::Number(n) => number_method(n.as_f64().unwrap_or(f64::NAN), name, &values)?,
            Value::Object(map) => object_method(map, name, &values)?,
            Value::Bool(b) if name == "toString" => Some(Value::String(b.to_string())),
            _ => None,
        };
        self.finish(callee, result, optional)
    }

    fn finish(
        &mut self,
        callee: &Expr,
        result: Option<Value>,
        optional: bool,
    ) -> Result<Option<Value>, TransformError> {
        match result {
            Some(value) => {
                self.charge(&value)?;
                Ok(Some(value))
            }
            None if optional => Ok(None),
            None => Err(not_a_function(&describe(callee))),
        }
    }

    /// Charge for the size of a freshly built or copied value.
    fn charge(&mut self, value: &Value) -> Result<(), TransformError> {
        if let Value::String(s) = value {
            check_string_len(s.len())?;
        }
        let cost = self.weight(value)?;
        self.tick(cost)
    }

    fn weight(&self, value: &Value) -> Result<u64, TransformError> {
        weigh(value, self.max_depth).ok_or(TransformError::DepthLimit {
            limit: self.max_depth,
        })
    }

    fn callable<'e>(&self, element: Option<&'e Element>, method: &str) -> Result<Callable<'e>, TransformError> {
        match element {
            Some(Element::Item(Expr::Arrow(arrow))) => Ok(Callable::Arrow(arrow)),
            Some(Element::Item(Expr::Ident(name)))
                if !self.is_bound(name) && is_global_function(name) =>
            {
                Ok(Callable::Global(name.clone()))
            }
            Some(Element::Item(Expr::Member { object, property, .. })) => {
                match self.namespace(object) {
                    Some(ns) if is_global_function(&format!("{ns}.{property}")) => {
                        Ok(Callable::Global(format!("{ns}.{property}")))
                    }
                    _ => Err(not_a_callback(method, element)),
                }
            }
            _ => Err(not_a_callback(method, element)),
        }
    }

    fn invoke(&mut self, callable: &Callable<'_>, args: Vec<Value>) -> Result<Value, TransformError> {
        self.tick(1)?;
        match callable {
            Callable::Global(path) => self.global(path, &args),
            Callable::Arrow(arrow) => {
                let base = self.scopes.len();
                let mut args = args.into_iter();
                for param in &arrow.params {
                    let value = args.next().unwrap_or(Value::Null);
                    self.scopes.push((param.clone(), Rc::new(value)));
                }
                let result = self.eval(&arrow.body);
                self.scopes.truncate(base);
                result
            }
        }
    }

    fn callback_method(
        &mut self,
        items: Vec<Value>,
        name: &str,
        args: &[Element],
    ) -> Result<Value, TransformError> {
        if name == "sort" && args.is_empty() {
            let mut items = items;
            self.tick(items.len() as u64)?;
            items.sort_by_cached_key(to_js_string);
            return Ok(Value::Array(items));
        }
        let callback = self.callable(args.first(), name)?;
        let index = |i: usize| Value::from(i);

        let value = match name {
            "map" => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    out.push(self.invoke(&callback, vec![item, index(i)])?);
                }
                Value::Array(out)
            }
            "flatMap" => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    out.push(self.invoke(&callback, vec![item, index(i)])?);
                }
                let flat = flatten(&out, 1);
                self.tick(flat.len() as u64)?;
                Value::Array(flat)
            }
            "forEach" => {
                for (i, item) in items.into_iter().enumerate() {
                    self.invoke(&callback, vec![item, index(i)])?;
                }
                Value::Null
            }
            "filter" => {
                let mut out = Vec::new();
                for (i, item) in items.into_iter().enumerate() {
                    if truthy(&self.invoke(&callback, vec![item.clone(), index(i)])?) {
                        out.push(item);
                    }
                }
                Value::Array(out)
            }
            "find" => {
                let mut found = Value::Null;
                for (i, item) in items.into_iter().enumerate() {
                    if truthy(&self.invoke(&callback, vec![item.clone(), index(i)])?) {
                        found = item;
                        break;
                    }
                }
                found
            }
            "findIndex" => {
                let mut found = -1.0;
                for (i, item) in items.into_iter().enumerate() {
                    if truthy(&self.invoke(&callback, vec![item, index(i)])?) {
                        found = i as f64;
                        break;
                    }
                }
                number_value(found)
            }
            "some" => {
                let mut any = false;
                for (i, item) in items.into_iter().enumerate() {
                    if truthy(&self.invoke(&callback, vec![item, index(i)])?) {
                        any = true;
                        break;
                    }
                }
                Value::Bool(any)
            }
            "every" => {
                let mut all = true;
                for (i, item) in items.into_iter().enumerate() {
                    if !truthy(&self.invoke(&callback, vec![item, index(i)])?) {
                        all = false;
                        break;
                    }
                }
                Value::Bool(all)
            }
            "reduce" => {
                let mut iter = items.into_iter().enumerate();
                let mut acc = match args.get(1) {
                    Some(Element::Item(initial)) => self.eval(initial)?,
                    Some(Element::Spread(_)) => {
                        return Err(TransformError::runtime(
                            "TypeError: spread is not supported for the reduce initial value",
                        ))
                    }
                    None => match iter.next() {
                        Some((_, first)) => first,
                        None => {
                            return Err(TransformError::runtime(
                                "TypeError: Reduce of empty array with no initial value",
                            ))
                        }
                    },
                };
                for (i, item) in iter {
                    acc = self.invoke(&callback, vec![acc, item, index(i)])?;
                }
                acc
            }
            "sort" => Value::Array(self.sort_with(items, &callback)?),
            other => return Err(not_a_function(other)),
        };
        self.weight(&value)?;
        Ok(value)
    }

    /// Stable merge sort driven by a user comparator. Inconsistent
    /// comparators produce some permutation rather than a failure.
    fn sort_with(
        &mut self,
        mut items: Vec<Value>,
        callback: &Callable<'_>,
    ) -> Result<Vec<Value>, TransformError> {
        if items.len() <= 1 {
            return Ok(items);
        }
        let right = items.split_off(items.len() / 2);
        let left = self.sort_with(items, callback)?;
        let right = self.sort_with(right, callback)?;

        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();
        while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
            let order = self.invoke(callback, vec![l.clone(), r.clone()])?;
            let take_right = to_number(&order) > 0.0;
            let next = if take_right { right.next() } else { left.next() };
            merged.extend(next);
        }
        merged.extend(left);
        merged.extend(right);
        Ok(merged)
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    let numeric = |f: fn(f64, f64) -> f64| number_value(f(to_number(l), to_number(r)));
    let ordered = |accept: fn(Ordering) -> bool| Value::Bool(compare(l, r).is_some_and(accept));

    match op {
        BinaryOp::Add => add(l, r),
        BinaryOp::Sub => numeric(|a, b| a - b),
        BinaryOp::Mul => numeric(|a, b| a * b),
        BinaryOp::Div => numeric(|a, b| a / b),
        BinaryOp::Rem => numeric(|a, b| a % b),
        BinaryOp::Lt => ordered(Ordering::is_lt),
        BinaryOp::Le => ordered(Ordering::is_le),
        BinaryOp::Gt => ordered(Ordering::is_gt),
        BinaryOp::Ge => ordered(Ordering::is_ge),
        BinaryOp::LooseEq => Value::Bool(loose_equals(l, r)),
        BinaryOp::LooseNe => Value::Bool(!loose_equals(l, r)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(l, r)),
        BinaryOp::StrictNe => Value::Bool(!strict_equals(l, r)),
    }
}

/// Size of `value` in steps, or `None` when it nests deeper than `limit`.
fn weigh(value: &Value, limit: usize) -> Option<u64> {
    match value {
        Value::String(s) => Some(s.len() as u64 / BYTES_PER_STEP),
        Value::Array(items) => {
            let limit = limit.checked_sub(1)?;
            items.iter().try_fold(items.len() as u64, |total, item| {
                Some(total.saturating_add(weigh(item, limit)?))
            })
        }
        Value::Object(map) => {
            let limit = limit.checked_sub(1)?;
            map.values().try_fold(map.len() as u64, |total, item| {
                Some(total.saturating_add(weigh(item, limit)?))
            })
        }
        _ => Some(0),
    }
}

fn check_string_len(len: usize) -> Result<(), TransformError> {
    if len > MAX_STRING_LEN {
        return Err(TransformError::runtime("RangeError: Invalid string length"));
    }
    Ok(())
}

fn read_of_null(property: &str) -> TransformError {
    TransformError::runtime(format!(
        "TypeError: Cannot read properties of null (reading '{property}')"
    ))
}

fn not_a_function(what: &str) -> TransformError {
    TransformError::runtime(format!("TypeError: {what} is not a function"))
}

fn not_a_callback(method: &str, element: Option<&Element>) -> TransformError {
    let what = match element {
        Some(Element::Item(expr)) | Some(Element::Spread(expr)) => describe(expr),
        None => "undefined".into(),
    };
    TransformError::runtime(format!(
        "TypeError: {what} is not a function (in .{method})"
    ))
}

/// Short source-like rendering of an expression for error messages.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Literal(Value::String(s)) => format!("\"{s}\""),
        Expr::Literal(value) => match value {
            Value::Number(n) => format_number(n.as_f64().unwrap_or(f64::NAN)),
            other => to_js_string(other),
        },
        Expr::Member {
            object,
            property,
            optional,
        } => {
            let dot = if *optional { "?." } else { "." };
            format!("{}{dot}{property}", describe(object))
        }
        Expr::Index { object, index, .. } => format!("{}[{}]", describe(object), describe(index)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        Expr::Arrow(_) => "(arrow function)".into(),
        _ => "expression".into(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::transform::evaluate;

    fn eval(expr: &str, response: Value) -> Value {
        evaluate(expr, response, &TransformLimits::default()).unwrap()
    }

    fn eval_err(expr: &str, response: Value) -> String {
        evaluate(expr, response, &TransformLimits::default())
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn arithmetic_and_concatenation() {
        assert_eq!(eval("1 + 2 * 3", json!(null)), json!(7));
        assert_eq!(eval("'n=' + (1 + 2)", json!(null)), json!("n=3"));
        assert_eq!(eval("7 % 4", json!(null)), json!(3));
        assert_eq!(eval("1 / 0", json!(null)), Value::Null);
        assert_eq!(eval("10 / 4", json!(null)), json!(2.5));
    }

    #[test]
    fn missing_keys_read_as_null() {
        assert_eq!(eval("response.nope", json!({})), Value::Null);
        assert_eq!(eval("response.items[5]", json!({"items": [1]})), Value::Null);
    }

    #[test]
    fn reading_through_null_is_a_type_error() {
        let message = eval_err("response.a.b", json!({"a": null}));
        assert_eq!(
            message,
            "TypeError: Cannot read properties of null (reading 'b')"
        );
    }

    #[test]
    fn optional_chaining_short_circuits() {
        assert_eq!(eval("response.a?.b.c", json!({"a": null})), Value::Null);
        assert_eq!(eval("response.a?.[0]", json!({})), Value::Null);
        assert_eq!(eval("response.a?.toUpperCase()", json!({})), Value::Null);
        assert_eq!(eval("response.a?.b ?? 'none'", json!({})), json!("none"));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(eval("response.x || 'fallback'", json!({"x": ""})), json!("fallback"));
        assert_eq!(eval("response.x ?? 'fallback'", json!({"x": ""})), json!(""));
        assert_eq!(eval("response.x && response.x.y", json!({"x": null})), Value::Null);
    }

    #[test]
    fn callbacks_receive_item_and_index() {
        let response = json!({"items": ["a", "b", "c"]});
        assert_eq!(
            eval("response.items.map((x, i) => `${i}:${x}`)", response),
            json!(["0:a", "1:b", "2:c"])
        );
    }

    #[test]
    fn reduce_with_and_without_initial_value() {
        let response = json!([1, 2, 3, 4]);
        assert_eq!(eval("response.reduce((a, b) => a + b)", response.clone()), json!(10));
        assert_eq!(eval("response.reduce((a, b) => a + b, 10)", response), json!(20));
        assert!(eval_err("[].reduce((a, b) => a + b)", json!(null)).contains("Reduce of empty array"));
    }

    #[test]
    fn sort_with_and_without_comparator() {
        let response = json!([{"n": 3}, {"n": 1}, {"n": 2}]);
        assert_eq!(
            eval("response.sort((a, b) => a.n - b.n).map(x => x.n)", response),
            json!([1, 2, 3])
        );
        assert_eq!(eval("[10, 9, 1].sort()", json!(null)), json!([1, 10, 9]));
        // Inconsistent comparators still terminate.
        assert_eq!(
            eval("[1, 2, 3].sort(() => 1).length", json!(null)),
            json!(3)
        );
    }

    #[test]
    fn globals_as_callbacks() {
        assert_eq!(eval("['1', '2'].map(Number)", json!(null)), json!([1, 2]));
        assert_eq!(eval("[0, 1, '', 'a'].filter(Boolean)", json!(null)), json!([1, "a"]));
        assert_eq!(eval("[1.4, 2.6].map(Math.round)", json!(null)), json!([1, 3]));
    }

    #[test]
    fn object_literals_and_spread() {
        assert_eq!(
            eval("({...response, b: 2, ['c' + 1]: 3})", json!({"a": 1})),
            json!({"a": 1, "b": 2, "c1": 3})
        );
        assert_eq!(eval("[...response, 3]", json!([1, 2])), json!([1, 2, 3]));
        assert_eq!(eval("Math.max(...response)", json!([4, 9, 2])), json!(9));
    }

    #[test]
    fn namespaces_and_constants() {
        assert_eq!(eval("Object.keys(response).length", json!({"a": 1, "b": 2})), json!(2));
        assert_eq!(eval("Math.PI > 3", json!(null)), json!(true));
        assert_eq!(eval("typeof response", json!([])), json!("object"));
        assert_eq!(eval("typeof nothing", json!(null)), json!("undefined"));
        assert_eq!(eval("Array.isArray(response)", json!([])), json!(true));
    }

    #[test]
    fn unknown_names_and_methods() {
        assert_eq!(eval_err("foo", json!(null)), "ReferenceError: foo is not defined");
        assert_eq!(
            eval_err("response.items.frobnicate()", json!({"items": []})),
            "TypeError: response.items.frobnicate is not a function"
        );
        assert_eq!(
            eval_err("Math.nope(1)", json!(null)),
            "TypeError: Math.nope is not a function"
        );
        assert!(eval_err("response.map(42)", json!([1])).starts_with("TypeError: 42 is not a function"));
    }

    #[test]
    fn arrow_outside_a_call_is_rejected() {
        assert!(eval_err("x => x", json!(null)).contains("arrow functions"));
    }

    #[test]
    fn parameters_shadow_globals() {
        assert_eq!(eval("response.map(Math => Math + 1)", json!([1])), json!([2]));
    }

    #[test]
    fn string_doubling_is_bounded() {
        let limits = TransformLimits::default();
        let err = evaluate(
            "response.reduce(acc => acc + acc, 'xxxxxxxxxxxxxxxx')",
            json!((0..40).collect::<Vec<_>>()),
            &limits,
        )
        .unwrap_err();
        assert_matches!(err, TransformError::Runtime(ref m) if m.contains("Invalid string length"));
    }
}
