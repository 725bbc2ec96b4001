/// Extension toggles consulted by the validator. Everything beyond the
/// WebAssembly 1.0 core is off unless the caller opts in; decoding and
/// parsing are feature-blind so a module can always be inspected.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
    pub mutable_global: bool,
    pub saturating_float_to_int: bool,
    pub sign_extension: bool,
    pub reference_types: bool,
    pub multi_value: bool,
    pub bulk_memory: bool,
    pub simd: bool,
    pub relaxed_simd: bool,
    pub threads: bool,
    pub tail_call: bool,
    pub multi_memory: bool,
    pub exceptions: bool,
    pub memory64: bool,
    pub extended_const: bool,
    pub function_references: bool,
    pub gc: bool,
}

impl Features {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            mutable_global: true,
            saturating_float_to_int: true,
            sign_extension: true,
            reference_types: true,
            multi_value: true,
            bulk_memory: true,
            simd: true,
            relaxed_simd: true,
            threads: true,
            tail_call: true,
            multi_memory: true,
            exceptions: true,
            memory64: true,
            extended_const: true,
            function_references: true,
            gc: true,
        }
    }

    /// Looks up a flag by its dashed name, e.g. `reference-types`.
    pub fn flag(&mut self, name: &str) -> Option<&mut bool> {
        let flag = match name {
            "mutable-global" => &mut self.mutable_global,
            "saturating-float-to-int" => &mut self.saturating_float_to_int,
            "sign-extension" => &mut self.sign_extension,
            "reference-types" => &mut self.reference_types,
            "multi-value" => &mut self.multi_value,
            "bulk-memory" => &mut self.bulk_memory,
            "simd" => &mut self.simd,
            "relaxed-simd" => &mut self.relaxed_simd,
            "threads" => &mut self.threads,
            "tail-call" => &mut self.tail_call,
            "multi-memory" => &mut self.multi_memory,
            "exceptions" => &mut self.exceptions,
            "memory64" => &mut self.memory64,
            "extended-const" => &mut self.extended_const,
            "function-references" => &mut self.function_references,
            "gc" => &mut self.gc,
            _ => return None,
        };
        Some(flag)
    }

    // The gc proposal builds on typed function references; enabling it
    // also admits the (ref $t) syntax.
    pub(crate) fn typed_refs(&self) -> bool {
        self.function_references || self.gc
    }
}
