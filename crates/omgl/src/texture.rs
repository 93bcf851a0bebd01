use crate::buffer::{shape_len, Buffer, BufferTarget, BufferUsage};
use crate::context::ContextCapabilities;
use crate::data_type::*;
use crate::image::ImageData;
use crate::impl_prelude::*;
use omgl_math::*;
use prelude_plus::*;

gl_enum!({
  pub enum TextureTarget {
    Texture1D = TEXTURE_1D,
    Texture2D = TEXTURE_2D,
    Texture3D = TEXTURE_3D,
    Texture1DArray = TEXTURE_1D_ARRAY,
    Texture2DArray = TEXTURE_2D_ARRAY,
    Rectangle = TEXTURE_RECTANGLE,
    Buffer = TEXTURE_BUFFER,
  }
});

impl TextureTarget {
  /// Number of size dimensions, array layers included.
  pub const fn dimensions(self) -> usize {
    match self {
      Self::Texture1D | Self::Buffer => 1,
      Self::Texture2D | Self::Texture1DArray | Self::Rectangle => 2,
      Self::Texture3D | Self::Texture2DArray => 3,
    }
  }

  /// The dimension which counts array layers, which doesn't shrink across
  /// mipmap levels.
  pub const fn layer_dimension(self) -> Option<usize> {
    match self {
      Self::Texture1DArray => Some(1),
      Self::Texture2DArray => Some(2),
      _ => None,
    }
  }

  pub const fn supports_mipmaps(self) -> bool { !matches!(self, Self::Rectangle | Self::Buffer) }
}

/// Size of a mipmap level of a texture of the given base size.
pub(crate) fn level_size(target: TextureTarget, size: &[usize], level: u32) -> Vec<usize> {
  size
    .iter()
    .enumerate()
    .map(|(i, &n)| {
      if target.layer_dimension() == Some(i) {
        n
      } else {
        n.checked_shr(level).unwrap_or(0).max(1)
      }
    })
    .collect()
}

/// Number of mipmap levels of a full chain down to 1x1, the base level
/// included.
pub(crate) fn mip_level_count(target: TextureTarget, size: &[usize]) -> u32 {
  if !target.supports_mipmaps() {
    return 1;
  }
  let largest = size
    .iter()
    .enumerate()
    .filter(|&(i, _)| target.layer_dimension() != Some(i))
    .map(|(_, &n)| n)
    .max()
    .unwrap_or(1)
    .max(1);
  usize::BITS - largest.leading_zeros()
}

fn check_level(target: TextureTarget, level: u32, levels: u32) -> Result<()> {
  if level >= levels {
    return Err(Error::invalid(format!(
      "level {} of a {:?} texture is not allocated, it has {} levels",
      level, target, levels,
    )));
  }
  Ok(())
}

gl_enum!({
  pub enum TextureFilter {
    Nearest = NEAREST,
    Linear = LINEAR,
  }
});

fn min_filter_to_raw(filter: TextureFilter, mipmap_filter: Option<TextureFilter>) -> u32 {
  use TextureFilter::*;
  match (filter, mipmap_filter) {
    (_, None) => filter.as_raw(),
    (Nearest, Some(Nearest)) => gl::NEAREST_MIPMAP_NEAREST,
    (Linear, Some(Nearest)) => gl::LINEAR_MIPMAP_NEAREST,
    (Nearest, Some(Linear)) => gl::NEAREST_MIPMAP_LINEAR,
    (Linear, Some(Linear)) => gl::LINEAR_MIPMAP_LINEAR,
  }
}

fn min_filter_from_raw(raw: u32) -> Option<(TextureFilter, Option<TextureFilter>)> {
  use TextureFilter::*;
  Some(match raw {
    gl::NEAREST_MIPMAP_NEAREST => (Nearest, Some(Nearest)),
    gl::LINEAR_MIPMAP_NEAREST => (Linear, Some(Nearest)),
    gl::NEAREST_MIPMAP_LINEAR => (Nearest, Some(Linear)),
    gl::LINEAR_MIPMAP_LINEAR => (Linear, Some(Linear)),
    _ => (TextureFilter::from_raw(raw)?, None),
  })
}

gl_enum!({
  pub enum TextureWrappingMode {
    ClampToEdge = CLAMP_TO_EDGE,
    ClampToBorder = CLAMP_TO_BORDER,
    MirroredRepeat = MIRRORED_REPEAT,
    Repeat = REPEAT,
    MirrorClampToEdge = MIRROR_CLAMP_TO_EDGE,
  }
});

gl_enum!({
  pub enum TextureCompareMode {
    None = NONE,
    CompareRefToTexture = COMPARE_REF_TO_TEXTURE,
  }
});

gl_enum!({
  pub enum TextureCompareFunc {
    Never = NEVER,
    Less = LESS,
    Equal = EQUAL,
    LessOrEqual = LEQUAL,
    Greater = GREATER,
    NotEqual = NOTEQUAL,
    GreaterOrEqual = GEQUAL,
    Always = ALWAYS,
  }
});

gl_enum!({
  pub enum DepthStencilMode {
    Depth = DEPTH_COMPONENT,
    Stencil = STENCIL_INDEX,
  }
});

gl_enum!({
  pub enum SwizzleComponent {
    Red = RED,
    Green = GREEN,
    Blue = BLUE,
    Alpha = ALPHA,
    Zero = ZERO,
    One = ONE,
  }
});

impl SwizzleComponent {
  pub const fn from_char(c: char) -> Option<Self> {
    Some(match c {
      'r' => Self::Red,
      'g' => Self::Green,
      'b' => Self::Blue,
      'a' => Self::Alpha,
      '0' => Self::Zero,
      '1' => Self::One,
      _ => return None,
    })
  }

  pub const fn to_char(self) -> char {
    match self {
      Self::Red => 'r',
      Self::Green => 'g',
      Self::Blue => 'b',
      Self::Alpha => 'a',
      Self::Zero => '0',
      Self::One => '1',
    }
  }
}

/// Where each of the red, green, blue and alpha channels seen by shaders is
/// taken from. Written as four characters out of `rgba01`, e.g. `"rrr1"`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Swizzle(pub [SwizzleComponent; 4]);

impl Swizzle {
  pub const IDENTITY: Self = Self([
    SwizzleComponent::Red,
    SwizzleComponent::Green,
    SwizzleComponent::Blue,
    SwizzleComponent::Alpha,
  ]);
  pub const GREY: Self = Self([
    SwizzleComponent::Red,
    SwizzleComponent::Red,
    SwizzleComponent::Red,
    SwizzleComponent::One,
  ]);
  pub const GREY_ALPHA: Self = Self([
    SwizzleComponent::Red,
    SwizzleComponent::Red,
    SwizzleComponent::Red,
    SwizzleComponent::Green,
  ]);

  fn to_raw(self) -> [i32; 4] { self.0.map(|c| c.as_raw() as i32) }

  fn from_raw(raw: [i32; 4]) -> Option<Self> {
    let mut components = [SwizzleComponent::Zero; 4];
    for (component, raw) in components.iter_mut().zip(raw) {
      *component = SwizzleComponent::from_raw(raw as u32)?;
    }
    Some(Self(components))
  }
}

impl str::FromStr for Swizzle {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::invalid(format!("{:?} is not a swizzle", s));
    let mut components = [SwizzleComponent::Zero; 4];
    let mut chars = s.chars();
    for component in &mut components {
      *component = chars.next().and_then(SwizzleComponent::from_char).ok_or_else(invalid)?;
    }
    if chars.next().is_some() {
      return Err(invalid());
    }
    Ok(Self(components))
  }
}

impl fmt::Display for Swizzle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.iter().try_for_each(|c| write!(f, "{}", c.to_char()))
  }
}

gl_enum!({
  /// Layout of pixel data on the client side.
  pub enum TextureFormat {
    Red = RED,
    RG = RG,
    RGB = RGB,
    BGR = BGR,
    RGBA = RGBA,
    BGRA = BGRA,
    RedInteger = RED_INTEGER,
    RGInteger = RG_INTEGER,
    RGBInteger = RGB_INTEGER,
    RGBAInteger = RGBA_INTEGER,
    DepthComponent = DEPTH_COMPONENT,
    StencilIndex = STENCIL_INDEX,
    DepthStencil = DEPTH_STENCIL,
  }
});

impl TextureFormat {
  pub const fn channels(self) -> usize {
    match self {
      Self::Red | Self::RedInteger | Self::DepthComponent | Self::StencilIndex => 1,
      Self::RG | Self::RGInteger | Self::DepthStencil => 2,
      Self::RGB | Self::BGR | Self::RGBInteger => 3,
      Self::RGBA | Self::BGRA | Self::RGBAInteger => 4,
    }
  }
}

/// The transfer format for `channels` channels, integer textures need the
/// `*_INTEGER` variants.
pub fn infer_format(channels: usize, integer: bool) -> Result<TextureFormat> {
  use TextureFormat::*;
  Ok(match (channels, integer) {
    (1, false) => Red,
    (2, false) => RG,
    (3, false) => RGB,
    (4, false) => RGBA,
    (1, true) => RedInteger,
    (2, true) => RGInteger,
    (3, true) => RGBInteger,
    (4, true) => RGBAInteger,
    _ => return Err(Error::invalid(format!("textures have 1 to 4 channels, not {}", channels))),
  })
}

gl_enum!({
  /// Layout of texels on the GPU side.
  pub enum TextureInternalFormat {
    R8 = R8,
    R8Snorm = R8_SNORM,
    R16 = R16,
    R16Snorm = R16_SNORM,
    R16F = R16F,
    R32F = R32F,
    R8I = R8I,
    R8UI = R8UI,
    R16I = R16I,
    R16UI = R16UI,
    R32I = R32I,
    R32UI = R32UI,
    RG8 = RG8,
    RG8Snorm = RG8_SNORM,
    RG16 = RG16,
    RG16Snorm = RG16_SNORM,
    RG16F = RG16F,
    RG32F = RG32F,
    RG8I = RG8I,
    RG8UI = RG8UI,
    RG16I = RG16I,
    RG16UI = RG16UI,
    RG32I = RG32I,
    RG32UI = RG32UI,
    RGB8 = RGB8,
    RGB8Snorm = RGB8_SNORM,
    RGB16 = RGB16,
    RGB16Snorm = RGB16_SNORM,
    RGB16F = RGB16F,
    RGB32F = RGB32F,
    RGB8I = RGB8I,
    RGB8UI = RGB8UI,
    RGB16I = RGB16I,
    RGB16UI = RGB16UI,
    RGB32I = RGB32I,
    RGB32UI = RGB32UI,
    RGBA8 = RGBA8,
    RGBA8Snorm = RGBA8_SNORM,
    RGBA16 = RGBA16,
    RGBA16Snorm = RGBA16_SNORM,
    RGBA16F = RGBA16F,
    RGBA32F = RGBA32F,
    RGBA8I = RGBA8I,
    RGBA8UI = RGBA8UI,
    RGBA16I = RGBA16I,
    RGBA16UI = RGBA16UI,
    RGBA32I = RGBA32I,
    RGBA32UI = RGBA32UI,
    SRGB8 = SRGB8,
    SRGB8Alpha8 = SRGB8_ALPHA8,
    DepthComponent16 = DEPTH_COMPONENT16,
    DepthComponent24 = DEPTH_COMPONENT24,
    DepthComponent32F = DEPTH_COMPONENT32F,
    Depth24Stencil8 = DEPTH24_STENCIL8,
  }
});

impl TextureInternalFormat {
  /// Whether shaders read the texels through integer samplers.
  pub const fn is_integer(self) -> bool {
    use TextureInternalFormat::*;
    matches!(
      self,
      R8I | R8UI | R16I | R16UI | R32I | R32UI | RG8I | RG8UI | RG16I | RG16UI | RG32I | RG32UI
        | RGB8I | RGB8UI | RGB16I | RGB16UI | RGB32I | RGB32UI | RGBA8I | RGBA8UI | RGBA16I
        | RGBA16UI | RGBA32I | RGBA32UI
    )
  }
}

/// Picks a sized internal format for `channels` channels of `data_type`.
/// Integer data is normalized unless `explicit` is set, in which case it stays
/// integral. 32-bit integers and floats are never normalized.
pub fn infer_internal_format(
  channels: usize,
  data_type: DataType,
  explicit: bool,
) -> Result<TextureInternalFormat> {
  use TextureInternalFormat::*;
  if !(1..=4).contains(&channels) {
    return Err(Error::invalid(format!("textures have 1 to 4 channels, not {}", channels)));
  }
  let formats = match (data_type, explicit) {
    (DataType::U8, false) => [R8, RG8, RGB8, RGBA8],
    (DataType::U8, true) => [R8UI, RG8UI, RGB8UI, RGBA8UI],
    (DataType::I8, false) => [R8Snorm, RG8Snorm, RGB8Snorm, RGBA8Snorm],
    (DataType::I8, true) => [R8I, RG8I, RGB8I, RGBA8I],
    (DataType::U16, false) => [R16, RG16, RGB16, RGBA16],
    (DataType::U16, true) => [R16UI, RG16UI, RGB16UI, RGBA16UI],
    (DataType::I16, false) => [R16Snorm, RG16Snorm, RGB16Snorm, RGBA16Snorm],
    (DataType::I16, true) => [R16I, RG16I, RGB16I, RGBA16I],
    (DataType::U32, _) => [R32UI, RG32UI, RGB32UI, RGBA32UI],
    (DataType::I32, _) => [R32I, RG32I, RGB32I, RGBA32I],
    (DataType::F32, _) => [R32F, RG32F, RGB32F, RGBA32F],
    (DataType::Bool | DataType::F64, _) => {
      return Err(Error::invalid(format!("no texture format stores {:?} values", data_type)));
    }
  };
  Ok(formats[channels - 1])
}

/// Sampling state applied to a texture when it is created.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureParameters {
  pub min_filter: (TextureFilter, Option<TextureFilter>),
  pub mag_filter: TextureFilter,
  pub wrap: Option<TextureWrappingMode>,
  pub swizzle: Option<Swizzle>,
}

impl Default for TextureParameters {
  fn default() -> Self {
    Self {
      min_filter: (TextureFilter::Linear, None),
      mag_filter: TextureFilter::Linear,
      wrap: None,
      swizzle: None,
    }
  }
}

/// Everything needed to create a [`Texture`]. `shape` is
/// `[size..., channels]`, e.g. `[width, height, 4]` for an RGBA 2D texture.
#[derive(Debug, Clone)]
pub struct TextureDesc<'a, T: Scalar> {
  pub shape: Vec<usize>,
  pub data: Option<&'a [T]>,
  pub internal_format: Option<TextureInternalFormat>,
  pub format: Option<TextureFormat>,
  pub mipmap: bool,
  pub parameters: TextureParameters,
}

impl<'a, T: Scalar> TextureDesc<'a, T> {
  /// A texture with uninitialized contents.
  pub fn new(shape: &[usize]) -> Self {
    Self {
      shape: shape.to_vec(),
      data: None,
      internal_format: None,
      format: None,
      mipmap: true,
      parameters: TextureParameters::default(),
    }
  }

  pub fn with_data(shape: &[usize], data: &'a [T]) -> Self { Self { data: Some(data), ..Self::new(shape) } }

  pub fn internal_format(mut self, internal_format: TextureInternalFormat) -> Self {
    self.internal_format = Some(internal_format);
    self
  }

  pub fn format(mut self, format: TextureFormat) -> Self {
    self.format = Some(format);
    self
  }

  pub fn mipmap(mut self, mipmap: bool) -> Self {
    self.mipmap = mipmap;
    self
  }

  pub fn parameters(mut self, parameters: TextureParameters) -> Self {
    self.parameters = parameters;
    self
  }

  pub fn swizzle(mut self, swizzle: Swizzle) -> Self {
    self.parameters.swizzle = Some(swizzle);
    self
  }

  /// Checks the shape against the target and the data, returning the number
  /// of channels.
  fn validate(&self, target: TextureTarget) -> Result<usize> {
    let dimensions = target.dimensions();
    if self.shape.len() != dimensions + 1 {
      return Err(Error::invalid(format!(
        "{:?} textures take a shape of {} sizes and a channel count, got {:?}",
        target, dimensions, self.shape,
      )));
    }
    if self.shape.iter().any(|&n| n == 0 || n > i32::MAX as usize) {
      return Err(Error::invalid(format!("invalid texture shape {:?}", self.shape)));
    }
    if let Some(data) = self.data {
      if data.len() != shape_len(&self.shape) {
        return Err(Error::invalid(format!(
          "shape {:?} doesn't match the data length {}",
          self.shape,
          data.len(),
        )));
      }
    }
    let channels = self.shape[dimensions];
    if let Some(format) = self.format {
      if format.channels() != channels {
        return Err(Error::invalid(format!("{:?} doesn't hold {} channels", format, channels)));
      }
    }
    Ok(channels)
  }
}

/// Access to the handle of any texture kind, e.g. to bind it to a texture
/// unit for a draw call.
pub trait TextureObject: fmt::Debug {
  fn texture_handle(&self) -> (&SharedContext, u32);
  fn target(&self) -> TextureTarget;

  /// Called after `glGenerateMipmap` has allocated the whole mipmap chain.
  fn mipmaps_generated(&self) {}

  /// Binds the texture to `unit` until something else is bound there.
  fn bind_to_unit(&self, unit: u32) -> Result<()> {
    let (ctx, addr) = self.texture_handle();
    check_unit(ctx, unit)?;
    ctx.bind_texture(unit, self.target().as_raw(), addr);
    Ok(())
  }

  /// Does nothing if a different texture is bound to `unit`.
  fn unbind_from_unit(&self, unit: u32) {
    let (ctx, addr) = self.texture_handle();
    let target = self.target().as_raw();
    if ctx.bound_texture(unit, target) == addr {
      ctx.bind_texture(unit, target, 0);
    }
  }
}

fn check_unit(ctx: &Context, unit: u32) -> Result<()> {
  let max_units = ctx.capabilities().max_texture_units;
  if unit >= max_units {
    return Err(Error::invalid(format!("texture unit {} exceeds the limit of {}", unit, max_units)));
  }
  Ok(())
}

fn gen_texture(ctx: &Context) -> u32 {
  let mut addr = 0;
  unsafe { ctx.raw_gl().GenTextures(1, &mut addr) };
  addr
}

fn bind_texture_scoped<Obj>(texture: &Obj, unit: Option<u32>) -> Result<TextureBinding<'_, Obj>>
where
  Obj: Object + TextureObject,
{
  let ctx = texture.ctx();
  let unit = match unit {
    Some(unit) => {
      check_unit(ctx, unit)?;
      unit
    }
    None => ctx.active_texture_unit(),
  };
  let target = texture.target().as_raw();
  let previous = ctx.bound_texture(unit, target);
  ctx.bind_texture(unit, target, texture.addr());
  Ok(TextureBinding { texture, unit, previous })
}

#[derive(Debug)]
pub struct Texture {
  ctx: SharedContext,
  addr: u32,
  target: TextureTarget,
  shape: Vec<usize>,
  data_type: DataType,
  internal_format: TextureInternalFormat,
  format: TextureFormat,
  levels: Cell<u32>,
}

unsafe impl Object for Texture {
  const DEBUG_TYPE_IDENTIFIER: u32 = gl::TEXTURE;

  #[inline(always)]
  fn ctx(&self) -> &SharedContext { &self.ctx }
  #[inline(always)]
  fn addr(&self) -> u32 { self.addr }
}

impl TextureObject for Texture {
  #[inline(always)]
  fn texture_handle(&self) -> (&SharedContext, u32) { (&self.ctx, self.addr) }
  #[inline(always)]
  fn target(&self) -> TextureTarget { self.target }

  fn mipmaps_generated(&self) { self.levels.set(mip_level_count(self.target, self.size())) }
}

impl Texture {
  pub fn new<T: Scalar>(ctx: SharedContext, target: TextureTarget, desc: TextureDesc<'_, T>) -> Result<Self> {
    if target == TextureTarget::Buffer {
      return Err(Error::invalid("buffer textures are created with BufferTexture::new"));
    }
    let channels = desc.validate(target)?;
    let size = &desc.shape[..target.dimensions()];
    check_size_limits(ctx.capabilities(), target, size)?;

    let internal_format = match desc.internal_format {
      Some(internal_format) => internal_format,
      None => infer_internal_format(channels, T::DATA_TYPE, false)?,
    };
    let format = match desc.format {
      Some(format) => format,
      None => infer_format(channels, internal_format.is_integer())?,
    };

    let addr = gen_texture(&ctx);
    let texture = Self {
      ctx,
      addr,
      target,
      shape: desc.shape.clone(),
      data_type: T::DATA_TYPE,
      internal_format,
      format,
      levels: Cell::new(1),
    };

    let binding = texture.bind();
    let gl = binding.raw_gl();
    let gl_target = binding.target_raw();
    let data_ptr = desc.data.map_or(ptr::null(), |data| data.as_ptr() as *const c_void);
    let gl_internal_format = internal_format.as_raw() as i32;
    let gl_type = T::DATA_TYPE.as_raw();
    let s = |i: usize| size[i] as i32;
    unsafe {
      match size.len() {
        1 => gl.TexImage1D(gl_target, 0, gl_internal_format, s(0), 0, format.as_raw(), gl_type, data_ptr),
        2 => gl.TexImage2D(gl_target, 0, gl_internal_format, s(0), s(1), 0, format.as_raw(), gl_type, data_ptr),
        _ => gl.TexImage3D(
          gl_target,
          0,
          gl_internal_format,
          s(0),
          s(1),
          s(2),
          0,
          format.as_raw(),
          gl_type,
          data_ptr,
        ),
      }
    }

    binding.apply_parameters(&desc.parameters);
    if desc.mipmap && target.supports_mipmaps() {
      binding.generate_mipmap();
    }
    drop(binding);

    trace!("created {:?} texture #{} of shape {:?} as {:?}", target, texture.addr, texture.shape, internal_format);
    Ok(texture)
  }

  /// Decodes a PNG or JPEG file into a 2D texture. Images are stored top row
  /// first while GL expects the bottom row first, hence `flip`.
  pub fn open(ctx: SharedContext, path: impl AsRef<Path>, flip: bool) -> Result<Self> {
    let mut image = ImageData::open(path)?;
    if flip {
      image.flip_vertically();
    }
    Self::from_image(ctx, &image)
  }

  /// Grey images are sampled as `rrr1` and grey images with alpha as `rrrg`.
  pub fn from_image(ctx: SharedContext, image: &ImageData) -> Result<Self> {
    let mut desc = TextureDesc::with_data(&[image.width, image.height, image.channels], image.data.as_slice());
    match image.channels {
      1 => desc = desc.swizzle(Swizzle::GREY),
      2 => desc = desc.swizzle(Swizzle::GREY_ALPHA),
      _ => {}
    }
    Self::new(ctx, TextureTarget::Texture2D, desc)
  }

  #[inline(always)]
  pub fn shape(&self) -> &[usize] { &self.shape }
  /// The shape without the channel count.
  #[inline(always)]
  pub fn size(&self) -> &[usize] { &self.shape[..self.shape.len() - 1] }
  #[inline(always)]
  pub fn channels(&self) -> usize { self.shape[self.shape.len() - 1] }
  #[inline(always)]
  pub fn data_type(&self) -> DataType { self.data_type }
  #[inline(always)]
  pub fn internal_format(&self) -> TextureInternalFormat { self.internal_format }
  #[inline(always)]
  pub fn format(&self) -> TextureFormat { self.format }
  /// Number of allocated mipmap levels.
  #[inline(always)]
  pub fn levels(&self) -> u32 { self.levels.get() }

  #[inline(always)]
  pub fn width(&self) -> usize { self.size()[0] }
  #[inline(always)]
  pub fn height(&self) -> Option<usize> { self.size().get(1).copied() }
  #[inline(always)]
  pub fn depth(&self) -> Option<usize> { self.size().get(2).copied() }

  /// Binds to the active texture unit.
  #[inline]
  pub fn bind(&self) -> TextureBinding<'_, Self> {
    let ctx = &self.ctx;
    let unit = ctx.active_texture_unit();
    let target = self.target.as_raw();
    let previous = ctx.bound_texture(unit, target);
    ctx.bind_texture(unit, target, self.addr);
    TextureBinding { texture: self, unit, previous }
  }

  #[inline]
  pub fn bind_at(&self, unit: u32) -> Result<TextureBinding<'_, Self>> { bind_texture_scoped(self, Some(unit)) }

  pub fn generate_mipmap(&self) { self.bind().generate_mipmap() }

  pub fn set_parameters(&self, parameters: &TextureParameters) { self.bind().apply_parameters(parameters) }

  /// Replaces a region of a mipmap level. `size` and `offset` have one entry
  /// per texture dimension, and the channels of `data` follow `format`, which
  /// defaults to the format the texture was created with.
  pub fn set_data<T: Scalar>(
    &self,
    data: &[T],
    size: &[usize],
    offset: &[usize],
    level: u32,
    format: Option<TextureFormat>,
  ) -> Result<()> {
    let dimensions = self.target.dimensions();
    if size.len() != dimensions || offset.len() != dimensions {
      return Err(Error::invalid(format!(
        "{:?} textures take {} sizes and offsets, got {:?} and {:?}",
        self.target, dimensions, size, offset,
      )));
    }
    check_level(self.target, level, self.levels())?;
    let format = format.unwrap_or(self.format);
    if data.len() != shape_len(size) * format.channels() {
      return Err(Error::invalid(format!(
        "a {:?} region of {:?} holds {} values, got {}",
        size,
        format,
        shape_len(size) * format.channels(),
        data.len(),
      )));
    }
    let bounds = level_size(self.target, self.size(), level);
    for ((&n, &o), &max) in size.iter().zip(offset).zip(&bounds) {
      if o.checked_add(n).map_or(true, |end| end > max) {
        return Err(Error::invalid(format!(
          "region at {:?} of size {:?} doesn't fit into {:?}",
          offset, size, bounds,
        )));
      }
    }

    let binding = self.bind();
    let gl = binding.raw_gl();
    let gl_target = binding.target_raw();
    let level = level as i32;
    let (gl_format, gl_type, ptr) = (format.as_raw(), T::DATA_TYPE.as_raw(), data.as_ptr() as *const c_void);
    let s = |i: usize| size[i] as i32;
    let o = |i: usize| offset[i] as i32;
    unsafe {
      match dimensions {
        1 => gl.TexSubImage1D(gl_target, level, o(0), s(0), gl_format, gl_type, ptr),
        2 => gl.TexSubImage2D(gl_target, level, o(0), o(1), s(0), s(1), gl_format, gl_type, ptr),
        _ => gl.TexSubImage3D(gl_target, level, o(0), o(1), o(2), s(0), s(1), s(2), gl_format, gl_type, ptr),
      }
    }
    Ok(())
  }

  /// Reads back a whole mipmap level, converted to `T` by the driver.
  pub fn get_data<T: Scalar>(&self, level: u32) -> Result<Vec<T>> {
    check_level(self.target, level, self.levels())?;
    let len = shape_len(&level_size(self.target, self.size(), level)) * self.format.channels();
    let mut data: Vec<T> = vec![T::default(); len];

    let binding = self.bind();
    unsafe {
      binding.raw_gl().GetTexImage(
        binding.target_raw(),
        level as i32,
        self.format.as_raw(),
        T::DATA_TYPE.as_raw(),
        data.as_mut_ptr() as *mut c_void,
      )
    };
    Ok(data)
  }
}

fn size_limit(caps: &ContextCapabilities, target: TextureTarget, dimension: usize) -> u32 {
  if target.layer_dimension() == Some(dimension) {
    return caps.max_array_texture_layers;
  }
  match target {
    TextureTarget::Texture3D => caps.max_3d_texture_size,
    TextureTarget::Rectangle => caps.max_rectangle_texture_size,
    _ => caps.max_texture_size,
  }
}

fn check_size_limits(caps: &ContextCapabilities, target: TextureTarget, size: &[usize]) -> Result<()> {
  for (i, &n) in size.iter().enumerate() {
    let max = size_limit(caps, target, i);
    if n > max as usize {
      return Err(Error::invalid(format!("texture size {:?} exceeds the limit of {}", size, max)));
    }
  }
  Ok(())
}

impl Drop for Texture {
  fn drop(&mut self) {
    self.ctx.forget_texture(self.addr);
    unsafe { self.raw_gl().DeleteTextures(1, &self.addr) };
  }
}

/// A texture bound to a texture unit. Sampling parameters are read and
/// written through the binding.
#[derive(Debug)]
pub struct TextureBinding<'obj, Obj: Object + TextureObject> {
  texture: &'obj Obj,
  unit: u32,
  previous: u32,
}

impl<'obj, Obj: Object + TextureObject> ObjectBinding<Obj> for TextureBinding<'obj, Obj> {
  #[inline(always)]
  fn object(&self) -> &Obj { self.texture }
}

impl<'obj, Obj: Object + TextureObject> Drop for TextureBinding<'obj, Obj> {
  fn drop(&mut self) {
    let target = self.texture.target().as_raw();
    self.ctx().bind_texture(self.unit, target, self.previous);
  }
}

impl<'obj, Obj: Object + TextureObject> TextureBinding<'obj, Obj> {
  #[inline(always)]
  pub fn unit(&self) -> u32 { self.unit }

  /// Parameter calls act on the active unit, which may have been switched by
  /// a later binding.
  fn target_raw(&self) -> u32 {
    self.ctx().set_active_texture_unit(self.unit);
    self.texture.target().as_raw()
  }

  fn get_param_i(&self, pname: u32) -> i32 {
    let mut value = 0;
    unsafe { self.raw_gl().GetTexParameteriv(self.target_raw(), pname, &mut value) };
    value
  }

  fn set_param_i(&self, pname: u32, value: i32) {
    unsafe { self.raw_gl().TexParameteri(self.target_raw(), pname, value) };
  }

  fn get_param_f(&self, pname: u32) -> f32 {
    let mut value = 0.0;
    unsafe { self.raw_gl().GetTexParameterfv(self.target_raw(), pname, &mut value) };
    value
  }

  fn set_param_f(&self, pname: u32, value: f32) {
    unsafe { self.raw_gl().TexParameterf(self.target_raw(), pname, value) };
  }

  #[inline]
  fn get_param_enum<E>(&self, pname: u32, from_raw: fn(u32) -> Option<E>) -> Option<E> {
    from_raw(self.get_param_i(pname) as u32)
  }

  pub fn generate_mipmap(&self) {
    unsafe { self.raw_gl().GenerateMipmap(self.target_raw()) };
    self.texture.mipmaps_generated();
  }

  pub fn apply_parameters(&self, parameters: &TextureParameters) {
    let (filter, mipmap_filter) = parameters.min_filter;
    self.set_min_filter(filter, mipmap_filter);
    self.set_mag_filter(parameters.mag_filter);
    if let Some(mode) = parameters.wrap {
      self.set_wrapping_modes(mode);
    }
    if let Some(swizzle) = parameters.swizzle {
      self.set_swizzle(swizzle);
    }
  }

  pub fn min_filter(&self) -> Option<(TextureFilter, Option<TextureFilter>)> {
    min_filter_from_raw(self.get_param_i(gl::TEXTURE_MIN_FILTER) as u32)
  }

  pub fn set_min_filter(&self, filter: TextureFilter, mipmap_filter: Option<TextureFilter>) {
    self.set_param_i(gl::TEXTURE_MIN_FILTER, min_filter_to_raw(filter, mipmap_filter) as i32);
  }

  pub fn mag_filter(&self) -> Option<TextureFilter> {
    self.get_param_enum(gl::TEXTURE_MAG_FILTER, TextureFilter::from_raw)
  }

  pub fn set_mag_filter(&self, filter: TextureFilter) {
    self.set_param_i(gl::TEXTURE_MAG_FILTER, filter.as_raw() as i32);
  }

  pub fn lod_bias(&self) -> f32 { self.get_param_f(gl::TEXTURE_LOD_BIAS) }
  pub fn set_lod_bias(&self, bias: f32) { self.set_param_f(gl::TEXTURE_LOD_BIAS, bias) }
  pub fn min_lod(&self) -> f32 { self.get_param_f(gl::TEXTURE_MIN_LOD) }
  pub fn set_min_lod(&self, lod: f32) { self.set_param_f(gl::TEXTURE_MIN_LOD, lod) }
  pub fn max_lod(&self) -> f32 { self.get_param_f(gl::TEXTURE_MAX_LOD) }
  pub fn set_max_lod(&self, lod: f32) { self.set_param_f(gl::TEXTURE_MAX_LOD, lod) }
  pub fn base_level(&self) -> i32 { self.get_param_i(gl::TEXTURE_BASE_LEVEL) }
  pub fn set_base_level(&self, level: i32) { self.set_param_i(gl::TEXTURE_BASE_LEVEL, level) }
  pub fn max_level(&self) -> i32 { self.get_param_i(gl::TEXTURE_MAX_LEVEL) }
  pub fn set_max_level(&self, level: i32) { self.set_param_i(gl::TEXTURE_MAX_LEVEL, level) }

  pub fn border_color(&self) -> Colorf {
    let mut rgba = [0.0f32; 4];
    unsafe { self.raw_gl().GetTexParameterfv(self.target_raw(), gl::TEXTURE_BORDER_COLOR, rgba.as_mut_ptr()) };
    Colorf::from(rgba)
  }

  pub fn set_border_color(&self, color: Colorf) {
    let rgba = color.to_array();
    unsafe { self.raw_gl().TexParameterfv(self.target_raw(), gl::TEXTURE_BORDER_COLOR, rgba.as_ptr()) };
  }

  pub fn compare_mode(&self) -> Option<TextureCompareMode> {
    self.get_param_enum(gl::TEXTURE_COMPARE_MODE, TextureCompareMode::from_raw)
  }

  pub fn set_compare_mode(&self, mode: TextureCompareMode) {
    self.set_param_i(gl::TEXTURE_COMPARE_MODE, mode.as_raw() as i32);
  }

  pub fn compare_func(&self) -> Option<TextureCompareFunc> {
    self.get_param_enum(gl::TEXTURE_COMPARE_FUNC, TextureCompareFunc::from_raw)
  }

  pub fn set_compare_func(&self, func: TextureCompareFunc) {
    self.set_param_i(gl::TEXTURE_COMPARE_FUNC, func.as_raw() as i32);
  }

  pub fn depth_stencil_mode(&self) -> Option<DepthStencilMode> {
    self.get_param_enum(gl::DEPTH_STENCIL_TEXTURE_MODE, DepthStencilMode::from_raw)
  }

  pub fn set_depth_stencil_mode(&self, mode: DepthStencilMode) {
    self.set_param_i(gl::DEPTH_STENCIL_TEXTURE_MODE, mode.as_raw() as i32);
  }

  pub fn swizzle(&self) -> Option<Swizzle> {
    let mut raw = [0i32; 4];
    unsafe { self.raw_gl().GetTexParameteriv(self.target_raw(), gl::TEXTURE_SWIZZLE_RGBA, raw.as_mut_ptr()) };
    Swizzle::from_raw(raw)
  }

  pub fn set_swizzle(&self, swizzle: Swizzle) {
    let raw = swizzle.to_raw();
    unsafe { self.raw_gl().TexParameteriv(self.target_raw(), gl::TEXTURE_SWIZZLE_RGBA, raw.as_ptr()) };
  }

  pub fn wrap_s(&self) -> Option<TextureWrappingMode> {
    self.get_param_enum(gl::TEXTURE_WRAP_S, TextureWrappingMode::from_raw)
  }

  pub fn set_wrap_s(&self, mode: TextureWrappingMode) {
    self.set_param_i(gl::TEXTURE_WRAP_S, mode.as_raw() as i32);
  }

  pub fn wrap_t(&self) -> Option<TextureWrappingMode> {
    self.get_param_enum(gl::TEXTURE_WRAP_T, TextureWrappingMode::from_raw)
  }

  pub fn set_wrap_t(&self, mode: TextureWrappingMode) {
    self.set_param_i(gl::TEXTURE_WRAP_T, mode.as_raw() as i32);
  }

  pub fn wrap_r(&self) -> Option<TextureWrappingMode> {
    self.get_param_enum(gl::TEXTURE_WRAP_R, TextureWrappingMode::from_raw)
  }

  pub fn set_wrap_r(&self, mode: TextureWrappingMode) {
    self.set_param_i(gl::TEXTURE_WRAP_R, mode.as_raw() as i32);
  }

  pub fn set_wrapping_modes(&self, mode: TextureWrappingMode) {
    self.set_wrap_s(mode);
    self.set_wrap_t(mode);
    self.set_wrap_r(mode);
  }
}

/// A texture whose texels live in a buffer object.
fn check_buffer_offset(offset: usize, alignment: u32) -> Result<()> {
  if alignment > 1 && offset % alignment as usize != 0 {
    return Err(Error::invalid(format!(
      "buffer offset {} is not a multiple of the texture buffer alignment {}",
      offset, alignment,
    )));
  }
  Ok(())
}

#[derive(Debug)]
pub struct BufferTexture {
  ctx: SharedContext,
  addr: u32,
  internal_format: TextureInternalFormat,
  buffer_addr: u32,
  len: usize,
}

unsafe impl Object for BufferTexture {
  const DEBUG_TYPE_IDENTIFIER: u32 = gl::TEXTURE;

  #[inline(always)]
  fn ctx(&self) -> &SharedContext { &self.ctx }
  #[inline(always)]
  fn addr(&self) -> u32 { self.addr }
}

impl TextureObject for BufferTexture {
  #[inline(always)]
  fn texture_handle(&self) -> (&SharedContext, u32) { (&self.ctx, self.addr) }
  #[inline(always)]
  fn target(&self) -> TextureTarget { TextureTarget::Buffer }
}

impl BufferTexture {
  /// Attaches the store of `buffer`. Without an explicit internal format the
  /// texels keep the integer type of the buffer elements.
  pub fn new<T: VertexComponent>(
    buffer: &Buffer<T>,
    internal_format: Option<TextureInternalFormat>,
  ) -> Result<Self> {
    let channels = components_per_row::<T>(buffer.shape());
    let internal_format = match internal_format {
      Some(internal_format) => internal_format,
      None => infer_internal_format(channels, T::DATA_TYPE, true)?,
    };

    check_buffer_offset(buffer.offset(), buffer.ctx().capabilities().texture_buffer_offset_alignment)?;

    let ctx = Rc::clone(buffer.ctx());
    let addr = gen_texture(&ctx);
    let texture = Self {
      ctx,
      addr,
      internal_format,
      buffer_addr: buffer.addr(),
      len: buffer.len() * T::COMPONENTS as usize / channels,
    };

    let binding = texture.bind();
    let gl = binding.raw_gl();
    let gl_target = binding.target_raw();
    unsafe {
      if buffer.offset() == 0 {
        gl.TexBuffer(gl_target, internal_format.as_raw(), buffer.addr());
      } else {
        gl.TexBufferRange(
          gl_target,
          internal_format.as_raw(),
          buffer.addr(),
          buffer.offset() as isize,
          buffer.nbytes() as isize,
        );
      }
    }
    drop(binding);
    Ok(texture)
  }

  #[inline(always)]
  pub fn internal_format(&self) -> TextureInternalFormat { self.internal_format }
  #[inline(always)]
  pub fn buffer_addr(&self) -> u32 { self.buffer_addr }
  /// Number of texels.
  #[inline(always)]
  pub fn width(&self) -> usize { self.len }

  pub fn bind(&self) -> TextureBinding<'_, Self> {
    let ctx = &self.ctx;
    let unit = ctx.active_texture_unit();
    let target = gl::TEXTURE_BUFFER;
    let previous = ctx.bound_texture(unit, target);
    ctx.bind_texture(unit, target, self.addr);
    TextureBinding { texture: self, unit, previous }
  }

  #[inline]
  pub fn bind_at(&self, unit: u32) -> Result<TextureBinding<'_, Self>> { bind_texture_scoped(self, Some(unit)) }

  /// The buffer the driver reports as attached.
  pub fn bound_buffer(&self) -> u32 {
    let binding = self.bind();
    let mut value = 0;
    unsafe {
      binding.raw_gl().GetTexLevelParameteriv(
        binding.target_raw(),
        0,
        gl::TEXTURE_BUFFER_DATA_STORE_BINDING,
        &mut value,
      )
    };
    value.max(0) as u32
  }
}

impl Drop for BufferTexture {
  fn drop(&mut self) {
    self.ctx.forget_texture(self.addr);
    unsafe { self.raw_gl().DeleteTextures(1, &self.addr) };
  }
}

/// A buffer bound to `GL_TEXTURE_BUFFER` together with the texture reading
/// from it.
#[derive(Debug)]
pub struct TextureBuffer<T: VertexComponent> {
  texture: Rc<BufferTexture>,
  buffer: Buffer<T>,
}

impl<T: VertexComponent> TextureBuffer<T> {
  pub fn new(
    ctx: SharedContext,
    data: &[T],
    shape: Option<&[usize]>,
    usage: Option<BufferUsage>,
    internal_format: Option<TextureInternalFormat>,
  ) -> Result<Self> {
    let buffer = Buffer::with_data(ctx, BufferTarget::Texture, data, shape, usage)?;
    let texture = Rc::new(BufferTexture::new(&buffer, internal_format)?);
    Ok(Self { texture, buffer })
  }

  #[inline(always)]
  pub fn buffer(&self) -> &Buffer<T> { &self.buffer }
  #[inline(always)]
  pub fn buffer_mut(&mut self) -> &mut Buffer<T> { &mut self.buffer }
  #[inline(always)]
  pub fn texture(&self) -> &Rc<BufferTexture> { &self.texture }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn formats_by_channel_count() {
    assert_eq!(infer_format(1, false).unwrap(), TextureFormat::Red);
    assert_eq!(infer_format(3, false).unwrap(), TextureFormat::RGB);
    assert_eq!(infer_format(4, true).unwrap(), TextureFormat::RGBAInteger);
    assert!(infer_format(5, false).is_err());
    assert!(infer_format(0, true).is_err());
  }

  #[test]
  fn internal_formats() {
    use TextureInternalFormat::*;
    assert_eq!(infer_internal_format(4, DataType::U8, false).unwrap(), RGBA8);
    assert_eq!(infer_internal_format(2, DataType::U16, false).unwrap(), RG16);
    assert_eq!(infer_internal_format(1, DataType::F32, false).unwrap(), R32F);
    assert_eq!(infer_internal_format(4, DataType::U32, true).unwrap(), RGBA32UI);
    assert_eq!(infer_internal_format(1, DataType::I8, true).unwrap(), R8I);
    assert_eq!(infer_internal_format(3, DataType::I16, false).unwrap(), RGB16Snorm);
    assert!(infer_internal_format(4, DataType::F64, false).is_err());
    assert!(infer_internal_format(0, DataType::U8, false).is_err());
    assert!(RGBA32UI.is_integer());
    assert!(!RGBA8.is_integer());
  }

  #[test]
  fn swizzle_strings() {
    let swizzle: Swizzle = "rrr1".parse().unwrap();
    assert_eq!(
      swizzle,
      Swizzle([SwizzleComponent::Red, SwizzleComponent::Red, SwizzleComponent::Red, SwizzleComponent::One]),
    );
    assert_eq!(swizzle, Swizzle::GREY);
    assert_eq!(swizzle.to_string(), "rrr1");
    assert_eq!(Swizzle::GREY_ALPHA.to_string(), "rrrg");
    assert_eq!(Swizzle::IDENTITY.to_string(), "rgba");
    assert_eq!(Swizzle::from_raw(Swizzle::IDENTITY.to_raw()), Some(Swizzle::IDENTITY));
    assert!("rrr".parse::<Swizzle>().is_err());
    assert!("rgbax".parse::<Swizzle>().is_err());
    assert!("xyzw".parse::<Swizzle>().is_err());
  }

  #[test]
  fn min_filters() {
    use TextureFilter::*;
    for &filter in TextureFilter::VARIANTS {
      for mipmap_filter in [None, Some(Nearest), Some(Linear)] {
        let raw = min_filter_to_raw(filter, mipmap_filter);
        assert_eq!(min_filter_from_raw(raw), Some((filter, mipmap_filter)));
      }
    }
    assert_eq!(min_filter_to_raw(Linear, Some(Nearest)), gl::LINEAR_MIPMAP_NEAREST);
  }

  #[test]
  fn mipmap_level_sizes() {
    assert_eq!(level_size(TextureTarget::Texture2D, &[64, 16], 0), vec![64, 16]);
    assert_eq!(level_size(TextureTarget::Texture2D, &[64, 16], 3), vec![8, 2]);
    assert_eq!(level_size(TextureTarget::Texture2D, &[64, 16], 6), vec![1, 1]);
    assert_eq!(level_size(TextureTarget::Texture2DArray, &[8, 8, 5], 2), vec![2, 2, 5]);
    assert_eq!(level_size(TextureTarget::Texture1D, &[4], 64), vec![1]);
  }

  #[test]
  fn mipmap_level_counts() {
    assert_eq!(mip_level_count(TextureTarget::Texture2D, &[64, 16]), 7);
    assert_eq!(mip_level_count(TextureTarget::Texture2D, &[5, 3]), 3);
    assert_eq!(mip_level_count(TextureTarget::Texture1D, &[1]), 1);
    // layers don't shrink, so they don't count
    assert_eq!(mip_level_count(TextureTarget::Texture2DArray, &[4, 4, 256]), 3);
    assert_eq!(mip_level_count(TextureTarget::Rectangle, &[512, 512]), 1);
  }

  #[test]
  fn only_allocated_levels_are_accessible() {
    assert!(check_level(TextureTarget::Texture2D, 0, 1).is_ok());
    assert!(check_level(TextureTarget::Texture2D, 1, 1).is_err());
    assert!(check_level(TextureTarget::Texture2D, 6, 7).is_ok());
    assert!(check_level(TextureTarget::Texture2D, 7, 7).is_err());
    assert!(check_level(TextureTarget::Rectangle, 1, 1).is_err());
  }

  #[test]
  fn size_limits_depend_on_the_target() {
    let caps = ContextCapabilities {
      max_texture_size: 1024,
      max_3d_texture_size: 256,
      max_rectangle_texture_size: 512,
      max_array_texture_layers: 64,
      ..ContextCapabilities::default()
    };
    assert!(check_size_limits(&caps, TextureTarget::Texture2D, &[1024, 1024]).is_ok());
    assert!(check_size_limits(&caps, TextureTarget::Rectangle, &[1024, 8]).is_err());
    assert!(check_size_limits(&caps, TextureTarget::Rectangle, &[512, 512]).is_ok());
    assert!(check_size_limits(&caps, TextureTarget::Texture3D, &[256, 256, 257]).is_err());
    assert!(check_size_limits(&caps, TextureTarget::Texture2DArray, &[1024, 1024, 64]).is_ok());
    assert!(check_size_limits(&caps, TextureTarget::Texture2DArray, &[8, 8, 65]).is_err());
  }

  #[test]
  fn buffer_offsets_must_be_aligned() {
    assert!(check_buffer_offset(0, 256).is_ok());
    assert!(check_buffer_offset(512, 256).is_ok());
    assert!(check_buffer_offset(16, 256).is_err());
    assert!(check_buffer_offset(12, 1).is_ok());
    assert!(check_buffer_offset(12, 0).is_ok());
  }

  #[test]
  fn texture_descriptions_are_validated() {
    let data = [0u8; 2 * 3 * 4];
    let desc = TextureDesc::with_data(&[2, 3, 4], &data[..]);
    assert_eq!(desc.validate(TextureTarget::Texture2D).unwrap(), 4);
    assert!(desc.validate(TextureTarget::Texture3D).is_err());
    assert!(TextureDesc::with_data(&[2, 2, 4], &data[..]).validate(TextureTarget::Texture2D).is_err());
    assert!(TextureDesc::<u8>::new(&[0, 4, 1]).validate(TextureTarget::Texture2D).is_err());
    assert!(TextureDesc::with_data(&[2, 3, 4], &data[..])
      .format(TextureFormat::RGB)
      .validate(TextureTarget::Texture2D)
      .is_err());
  }

  #[test]
  fn target_dimensions() {
    assert_eq!(TextureTarget::Texture1D.dimensions(), 1);
    assert_eq!(TextureTarget::Texture1DArray.dimensions(), 2);
    assert_eq!(TextureTarget::Rectangle.dimensions(), 2);
    assert_eq!(TextureTarget::Texture2DArray.dimensions(), 3);
    assert!(!TextureTarget::Rectangle.supports_mipmaps());
  }
}
