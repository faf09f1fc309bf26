/// Describes a Batchmail specific error types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Error caused by the error on the client side.
    ClientError,
    /// Error caused by a reference to a resource that doesn't exist.
    NotFound,
    /// Unknown error.
    Unknown,
}
