use crate::lexer::LexingError;

/// Hook invoked with a message: the normalized command before it runs, or
/// the text of an error after a failed [`Echo::run`](crate::Echo::run).
pub type Hook = Box<dyn Fn(&str)>;

/// Turns a normalized command line into argv-style words.
///
/// The first word names the executable. Returning no words makes the start
/// step fail with [`ProcError::EmptyCommand`](crate::ProcError::EmptyCommand).
/// A blanket implementation exists for plain closures that cannot fail.
pub trait WordSplitter {
    fn split(&self, command: &str) -> Result<Vec<String>, LexingError>;
}

impl<F> WordSplitter for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn split(&self, command: &str) -> Result<Vec<String>, LexingError> {
        Ok(self(command))
    }
}

/// Resolves a variable name to its substitution value.
///
/// Unknown names are up to the implementation; the runner's
/// [`Environment`](crate::env::Environment) resolves them to an empty string.
pub trait VarResolver {
    fn resolve(&self, name: &str) -> String;
}

impl<F> VarResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, name: &str) -> String {
        self(name)
    }
}
