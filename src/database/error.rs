use std::{
    convert::Infallible,
    fmt::{self, Display},
};

use serde_json::{json, Value};
use thiserror::Error;
use warp::{
    filters::body::BodyDeserializeError,
    http::StatusCode,
    reject::{InvalidQuery, MethodNotAllowed, Rejection},
    Reply,
};

use super::schema::Id;

const SELF_SUBSCRIPTION_CONSTRAINT: &str = "prevent_self_subscription";

#[derive(Debug)]
pub struct QueryError {
    info: String,
    constraint: Option<String>,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self {
            info,
            constraint: None,
        }
    }

    /// Name of the violated database constraint, if any.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) => Self {
                info: format!("{e}"),
                constraint: e.constraint().map(str::to_owned),
            },
            sqlx::Error::RowNotFound => Self::new(String::from("RowNotFound")),
            sqlx::Error::ColumnNotFound(e) => Self::new(format!("Column not found: {e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::PoolTimedOut => Self::new(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(String::from("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(String::from("Worker crashed")),
            e => Self::new(format!("{e}")),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for QueryError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::new(format!("Migration failed: {value}"))
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info)
    }
}

impl std::error::Error for QueryError {}

/// Rejected input, reported against the field that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ingredient {0} is already in the recipe")]
    DuplicateIngredient(Id),

    #[error("Amount can not be less than 1")]
    InvalidQuantity,

    #[error("At least one tag is required")]
    TagsRequired,

    #[error("{message}")]
    Field { field: String, message: String },
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            ValidationError::DuplicateIngredient(_) | ValidationError::InvalidQuantity => {
                "ingredients"
            }
            ValidationError::TagsRequired => "tags",
            ValidationError::Field { field, .. } => field,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    AssociationNotFound(String),

    #[error("You can not subscribe to yourself")]
    SelfSubscription,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("query failed: {0}")]
    Query(QueryError),

    #[error("could not render document: {0}")]
    Render(String),
}

impl From<QueryError> for Error {
    fn from(value: QueryError) -> Self {
        if value.constraint() == Some(SELF_SUBSCRIPTION_CONSTRAINT) {
            return Error::SelfSubscription;
        }
        log::error!("Database error: {value}");
        Error::Query(value)
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        QueryError::from(value).into()
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::AlreadyExists(_)
            | Error::AssociationNotFound(_)
            | Error::SelfSubscription => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Query(_) | Error::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Error::Validation(e) => json!({ e.field_name(): [e.to_string()] }),
            Error::SelfSubscription => json!({ "author": [self.to_string()] }),
            Error::AlreadyExists(_) | Error::AssociationNotFound(_) => {
                json!({ "errors": self.to_string() })
            }
            Error::NotFound(_) | Error::Unauthorized | Error::Forbidden(_) => {
                json!({ "detail": self.to_string() })
            }
            Error::Query(_) | Error::Render(_) => json!({ "detail": "Internal server error" }),
        }
    }
}

impl warp::reject::Reject for Error {}

/// Turns crate errors and warp's own rejections into JSON responses.
pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(error) = rejection.find::<Error>() {
        (error.status(), error.body())
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "detail": "Not found." }))
    } else if let Some(e) = rejection.find::<BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, json!({ "detail": e.to_string() }))
    } else if let Some(e) = rejection.find::<InvalidQuery>() {
        (StatusCode::BAD_REQUEST, json!({ "detail": e.to_string() }))
    } else if rejection.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "detail": "Method not allowed." }),
        )
    } else {
        log::error!("Unhandled rejection: {rejection:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "detail": "Internal server error" }),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
