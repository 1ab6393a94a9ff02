//! Bundle up parameters and their values in a generic way.
//!
//! Options controlling how the bounding slab hierarchy is built are
//! handed over as a **ParamSet**. Lookups never fail: a missing
//! parameter yields the default given by the caller.

// slabs
use crate::core::slabs::Float;

#[derive(Debug, Clone)]
pub struct ParamSetItem<T> {
    pub name: String,
    pub values: Vec<T>,
    pub n_values: usize,
}

impl<T> ParamSetItem<T> {
    fn new(name: String, values: Vec<T>) -> Self {
        let n_values: usize = values.len();
        ParamSetItem {
            name,
            values,
            n_values,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParamSet {
    pub bools: Vec<ParamSetItem<bool>>,
    pub ints: Vec<ParamSetItem<i32>>,
    pub floats: Vec<ParamSetItem<Float>>,
    pub strings: Vec<ParamSetItem<String>>,
}

impl ParamSet {
    pub fn reset(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.floats.clear();
        self.strings.clear();
    }
    pub fn add_bool(&mut self, name: String, value: bool) {
        self.erase_bool(&name);
        self.bools.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn add_int(&mut self, name: String, value: i32) {
        self.erase_int(&name);
        self.ints.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn add_ints(&mut self, name: String, values: Vec<i32>) {
        self.erase_int(&name);
        self.ints.push(ParamSetItem::new(name, values));
    }
    pub fn add_float(&mut self, name: String, value: Float) {
        self.erase_float(&name);
        self.floats.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn add_floats(&mut self, name: String, values: Vec<Float>) {
        self.erase_float(&name);
        self.floats.push(ParamSetItem::new(name, values));
    }
    pub fn add_string(&mut self, name: String, value: String) {
        self.erase_string(&name);
        self.strings.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn erase_bool(&mut self, name: &str) -> bool {
        erase(&mut self.bools, name)
    }
    pub fn erase_int(&mut self, name: &str) -> bool {
        erase(&mut self.ints, name)
    }
    pub fn erase_float(&mut self, name: &str) -> bool {
        erase(&mut self.floats, name)
    }
    pub fn erase_string(&mut self, name: &str) -> bool {
        erase(&mut self.strings, name)
    }
    pub fn find_one_bool(&self, name: &str, d: bool) -> bool {
        lookup_one(&self.bools, name, d)
    }
    pub fn find_one_int(&self, name: &str, d: i32) -> i32 {
        lookup_one(&self.ints, name, d)
    }
    pub fn find_one_float(&self, name: &str, d: Float) -> Float {
        lookup_one(&self.floats, name, d)
    }
    pub fn find_one_string(&self, name: &str, d: String) -> String {
        lookup_one(&self.strings, name, d)
    }
    pub fn find_int(&self, name: &str) -> Vec<i32> {
        lookup_all(&self.ints, name)
    }
    pub fn find_float(&self, name: &str) -> Vec<Float> {
        lookup_all(&self.floats, name)
    }
    /// The type a parameter was stored with, if it exists at all.
    pub fn type_of(&self, name: &str) -> Option<&'static str> {
        if self.bools.iter().any(|v| v.name == name) {
            Some("bool")
        } else if self.ints.iter().any(|v| v.name == name) {
            Some("integer")
        } else if self.floats.iter().any(|v| v.name == name) {
            Some("float")
        } else if self.strings.iter().any(|v| v.name == name) {
            Some("string")
        } else {
            None
        }
    }
}

fn erase<T>(vec: &mut Vec<ParamSetItem<T>>, name: &str) -> bool {
    let before: usize = vec.len();
    vec.retain(|v| v.name != name);
    vec.len() != before
}

pub fn lookup_one<T>(vec: &[ParamSetItem<T>], name: &str, d: T) -> T
where
    T: Clone,
{
    for v in vec {
        if v.name == name && v.n_values == 1_usize {
            return v.values[0].clone();
        }
    }
    d
}

pub fn lookup_all<T>(vec: &[ParamSetItem<T>], name: &str) -> Vec<T>
where
    T: Clone,
{
    for v in vec {
        if v.name == name {
            return v.values.clone();
        }
    }
    Vec::new()
}
