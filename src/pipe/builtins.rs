use crate::exception::ValidationFault;
use crate::pipe::{Pipe, PipeResult};
use async_trait::async_trait;

/// A pipe that parses a string into an integer
pub struct ParseIntPipe {
    field: &'static str,
}

impl ParseIntPipe {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl Default for ParseIntPipe {
    fn default() -> Self {
        Self::new("value")
    }
}

#[async_trait]
impl Pipe for ParseIntPipe {
    type Input = String;
    type Output = i64;

    async fn transform(&self, input: String) -> PipeResult<i64> {
        input.trim().parse::<i64>().map_err(|_| {
            ValidationFault::single(self.field, format!("{} 不是合法的整数: {}", self.field, input))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_int() {
        let pipe = ParseIntPipe::new("page");
        assert_eq!(pipe.transform(" 12 ".to_string()).await.unwrap(), 12);

        let fault = pipe.transform("twelve".to_string()).await.unwrap_err();
        assert_eq!(fault.errors()[0].field, "page");
        assert_eq!(fault.joined_messages(), "page 不是合法的整数: twelve");
    }
}
