pub mod invocation;

pub use invocation::{ParamValue, RpcInvocation};
