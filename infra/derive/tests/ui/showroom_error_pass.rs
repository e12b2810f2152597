use showroom_derive::showroom_error;
use std::borrow::Cow;

#[showroom_error]
pub enum UploadError {
    #[error("Unsupported file{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read(path: &str) -> Result<Vec<u8>, UploadError> {
    std::fs::read(path).context("Reading upload")
}

fn main() {
    let err = read("/definitely/not/here").unwrap_err();
    assert!(err.to_string().starts_with("IO error (Reading upload)"));

    let internal: UploadError = "boom".into();
    let with_context = Err::<(), _>(internal).context("Saving logo").unwrap_err();
    assert_eq!(with_context.to_string(), "Internal error (Saving logo): boom");
}
