use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::keypad::Operation;
use crate::numeral::{ArithmeticError, Numeral};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// One evaluation: two operands and an operation. A request without an
// operation passes the second operand through unchanged, which is how a
// bare "=" primes the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request<N> {
    pub first: Option<N>,
    pub operation: Option<Operation>,
    pub second: N,
}

#[async_trait]
pub trait Evaluate<N: Numeral>: Send + Sync {
    async fn evaluate(&self, request: Request<N>) -> Result<N, EvalError>;
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error("Request is missing its first operand")]
    MissingOperand,
    #[error("Evaluator did not answer in time")]
    Unresponsive,
    #[error("Evaluator is gone")]
    Disconnected,
}

pub fn compute<N: Numeral>(request: Request<N>) -> Result<N, EvalError> {
    match request.operation {
        None => Ok(request.second),
        Some(op) => {
            let first = request.first.ok_or(EvalError::MissingOperand)?;
            Ok(N::apply(op, first, request.second)?)
        }
    }
}

// In-process evaluator, mostly for tests
pub struct LocalEvaluator;

#[async_trait]
impl<N: Numeral> Evaluate<N> for LocalEvaluator {
    async fn evaluate(&self, request: Request<N>) -> Result<N, EvalError> {
        compute(request)
    }
}

type Reply<N> = oneshot::Sender<Result<N, EvalError>>;

// The remote collaborator: a stateless worker behind a request queue,
// answering one request at a time. The queue stands in for the wire; the
// caller holds the only suspension point in the whole machine.
pub struct RemoteEvaluator<N: Numeral> {
    requests: mpsc::Sender<(Request<N>, Reply<N>)>,
    timeout: Duration,
}

impl<N: Numeral> RemoteEvaluator<N> {
    pub fn spawn() -> Self {
        let (requests, queue) = mpsc::channel(1);
        tokio::spawn(serve(queue));
        RemoteEvaluator {
            requests,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

async fn serve<N: Numeral>(mut queue: mpsc::Receiver<(Request<N>, Reply<N>)>) {
    while let Some((request, reply)) = queue.recv().await {
        tracing::debug!(?request, "serving evaluation");
        let _ = reply.send(compute(request));
    }
}

#[async_trait]
impl<N: Numeral> Evaluate<N> for RemoteEvaluator<N> {
    async fn evaluate(&self, request: Request<N>) -> Result<N, EvalError> {
        let (reply, answer) = oneshot::channel();
        self.requests
            .send((request, reply))
            .await
            .map_err(|_| EvalError::Disconnected)?;
        match tokio::time::timeout(self.timeout, answer).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(EvalError::Disconnected),
            Err(_) => Err(EvalError::Unresponsive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<N: Numeral>(first: N, operation: Operation, second: N) -> Request<N> {
        Request {
            first: Some(first),
            operation: Some(operation),
            second,
        }
    }

    #[test]
    fn test_compute_pass_through() {
        let primed = Request {
            first: None,
            operation: None,
            second: 5i64,
        };
        assert_eq!(compute(primed), Ok(5));
    }

    #[test]
    fn test_compute_missing_operand() {
        let malformed = Request {
            first: None,
            operation: Some(Operation::Add),
            second: 3i64,
        };
        assert_eq!(compute(malformed), Err(EvalError::MissingOperand));
    }

    #[test]
    fn test_compute_division_by_zero() {
        assert_eq!(
            compute(request(5i64, Operation::Div, 0)),
            Err(EvalError::Arithmetic(ArithmeticError::DivideByZero))
        );
    }

    #[tokio::test]
    async fn test_remote_round_trip() {
        let remote = RemoteEvaluator::spawn();
        assert_eq!(remote.evaluate(request(12i64, Operation::Add, 3)).await, Ok(15));
        assert_eq!(remote.evaluate(request(15i64, Operation::Mul, 2)).await, Ok(30));
    }

    #[tokio::test]
    async fn test_remote_disconnected() {
        let (requests, queue) = mpsc::channel(1);
        drop(queue);
        let remote = RemoteEvaluator::<i64> {
            requests,
            timeout: REQUEST_TIMEOUT,
        };
        assert_eq!(
            remote.evaluate(request(1, Operation::Add, 1)).await,
            Err(EvalError::Disconnected)
        );
    }

    #[tokio::test]
    async fn test_remote_unresponsive() {
        let (requests, mut queue) = mpsc::channel::<(Request<i64>, Reply<i64>)>(1);
        tokio::spawn(async move {
            // Take the request but never answer it
            let _held = queue.recv().await;
            std::future::pending::<()>().await;
        });
        let remote = RemoteEvaluator {
            requests,
            timeout: Duration::from_millis(50),
        };
        assert_eq!(
            remote.evaluate(request(1, Operation::Add, 1)).await,
            Err(EvalError::Unresponsive)
        );
    }
}
