use std::fmt;

/// Scalar storage type of one pixel sample, as discovered from a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
    /// Bit depth or representation with no native mapping (e.g. 1-bit or 12-bit allocation)
    Unknown,
}

impl ComponentType {
    /// Every component type, in declaration order
    pub const ALL: [ComponentType; 9] = [
        ComponentType::UInt8,
        ComponentType::Int8,
        ComponentType::UInt16,
        ComponentType::Int16,
        ComponentType::UInt32,
        ComponentType::Int32,
        ComponentType::Float32,
        ComponentType::Float64,
        ComponentType::Unknown,
    ];

    /// Maps BitsAllocated / PixelRepresentation to the stored integer type
    pub fn from_storage(bits_allocated: u16, signed: bool) -> Self {
        match (bits_allocated, signed) {
            (8, false) => ComponentType::UInt8,
            (8, true) => ComponentType::Int8,
            (16, false) => ComponentType::UInt16,
            (16, true) => ComponentType::Int16,
            (32, false) => ComponentType::UInt32,
            (32, true) => ComponentType::Int32,
            _ => ComponentType::Unknown,
        }
    }

    /// Smallest integer type able to hold every value in `min..=max`
    ///
    /// Unsigned types are preferred whenever `min` is non-negative.
    pub fn smallest_holding(min: f64, max: f64) -> Self {
        if min >= 0.0 {
            if max <= u8::MAX as f64 {
                ComponentType::UInt8
            } else if max <= u16::MAX as f64 {
                ComponentType::UInt16
            } else if max <= u32::MAX as f64 {
                ComponentType::UInt32
            } else {
                ComponentType::Float64
            }
        } else if min >= i8::MIN as f64 && max <= i8::MAX as f64 {
            ComponentType::Int8
        } else if min >= i16::MIN as f64 && max <= i16::MAX as f64 {
            ComponentType::Int16
        } else if min >= i32::MIN as f64 && max <= i32::MAX as f64 {
            ComponentType::Int32
        } else {
            ComponentType::Float64
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ComponentType::UInt8 => "uint8",
            ComponentType::Int8 => "int8",
            ComponentType::UInt16 => "uint16",
            ComponentType::Int16 => "int16",
            ComponentType::UInt32 => "uint32",
            ComponentType::Int32 => "int32",
            ComponentType::Float32 => "float32",
            ComponentType::Float64 => "float64",
            ComponentType::Unknown => "unknown",
        }
    }

    /// Whether this is a floating-point component type
    pub fn is_float(&self) -> bool {
        matches!(self, ComponentType::Float32 | ComponentType::Float64)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Voxel type written to the output volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoxelType {
    UInt8,
    Int16,
    Float32,
    Rgb8,
    Rgba8,
}

impl VoxelType {
    /// Number of interleaved samples per voxel
    pub fn samples(&self) -> usize {
        match self {
            VoxelType::Rgb8 => 3,
            VoxelType::Rgba8 => 4,
            _ => 1,
        }
    }

    /// Size in bytes of one sample
    pub fn sample_bytes(&self) -> usize {
        match self {
            VoxelType::UInt8 | VoxelType::Rgb8 | VoxelType::Rgba8 => 1,
            VoxelType::Int16 => 2,
            VoxelType::Float32 => 4,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            VoxelType::UInt8 => "uint8",
            VoxelType::Int16 => "int16",
            VoxelType::Float32 => "float32",
            VoxelType::Rgb8 => "rgb8",
            VoxelType::Rgba8 => "rgba8",
        }
    }
}

impl fmt::Display for VoxelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
