/// Declared type of a parameter slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    None,
    /// Host buffer the backend only reads.
    MemrefTempInput,
    /// Host buffer the backend fills.
    MemrefTempOutput,
}

/// One of the four parameter slots of an [`Operation`].
#[derive(Debug, Default)]
pub enum Param<'a> {
    #[default]
    None,
    /// Input buffer, read by the backend.
    TempInput(&'a [u8]),
    /// Output buffer. `size` starts at the buffer length; after invocation it
    /// holds the number of bytes written, or the size the backend needed when
    /// it answers with a short-buffer status.
    TempOutput { buffer: &'a mut [u8], size: usize },
}

impl<'a> Param<'a> {
    pub fn input(data: &'a [u8]) -> Self {
        Self::TempInput(data)
    }

    pub fn output(buffer: &'a mut [u8]) -> Self {
        let size = buffer.len();
        Self::TempOutput { buffer, size }
    }

    pub fn param_type(&self) -> ParamType {
        match self {
            Self::None => ParamType::None,
            Self::TempInput(_) => ParamType::MemrefTempInput,
            Self::TempOutput { .. } => ParamType::MemrefTempOutput,
        }
    }
}

/// Parameters of one command invocation.
#[derive(Debug, Default)]
pub struct Operation<'a> {
    params: [Param<'a>; 4],
}

impl<'a> Operation<'a> {
    pub fn new(p0: Param<'a>, p1: Param<'a>, p2: Param<'a>, p3: Param<'a>) -> Self {
        Self {
            params: [p0, p1, p2, p3],
        }
    }

    pub fn param_types(&self) -> [ParamType; 4] {
        [
            self.params[0].param_type(),
            self.params[1].param_type(),
            self.params[2].param_type(),
            self.params[3].param_type(),
        ]
    }

    pub fn param(&self, index: usize) -> Option<&Param<'a>> {
        self.params.get(index)
    }

    pub fn param_mut(&mut self, index: usize) -> Option<&mut Param<'a>> {
        self.params.get_mut(index)
    }

    /// Bytes of an input slot, if `index` is one.
    pub fn input(&self, index: usize) -> Option<&[u8]> {
        match self.params.get(index)? {
            Param::TempInput(data) => Some(*data),
            _ => None,
        }
    }

    /// Size reported for an output slot, if `index` is one.
    pub fn output_size(&self, index: usize) -> Option<usize> {
        match self.params.get(index)? {
            Param::TempOutput { size, .. } => Some(*size),
            _ => None,
        }
    }
}
