use crate::exception::{BindingResult, ValidationFault};
use async_trait::async_trait;
use std::marker::PhantomData;

pub mod builtins;
mod extractor;

pub use extractor::{Bound, ValidJson, ValidQuery};

pub type PipeResult<T> = Result<T, ValidationFault>;

/// The Pipe trait for transformation and validation
///
/// A failing pipe rejects the request with a [`ValidationFault`], which the exception
/// handler reports as `web.badRequest`.
#[async_trait]
pub trait Pipe: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn transform(&self, input: Self::Input) -> PipeResult<Self::Output>;
}

/// Field-level validation of a bound request payload.
///
/// ```
/// use keystone::exception::BindingResult;
/// use keystone::pipe::Validate;
///
/// struct CreateOrder {
///     sku: String,
///     quantity: u32,
/// }
///
/// impl Validate for CreateOrder {
///     fn validate(&self, result: &mut BindingResult) {
///         result
///             .reject_if(self.sku.is_empty(), "sku", "商品编号不能为空")
///             .reject_if(self.quantity == 0, "quantity", "数量必须大于0");
///     }
/// }
/// ```
pub trait Validate {
    fn validate(&self, result: &mut BindingResult);
}

/// Runs [`Validate`] and passes the value through untouched when it is valid.
pub struct ValidationPipe<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValidationPipe<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ValidationPipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Pipe for ValidationPipe<T>
where
    T: Validate + Send + 'static,
{
    type Input = T;
    type Output = T;

    async fn transform(&self, input: T) -> PipeResult<T> {
        let mut result = BindingResult::new();
        input.validate(&mut result);
        result.into_result().map(|()| input)
    }
}
