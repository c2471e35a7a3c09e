//! Terminal styling, plain text without the `colorized_output` feature

#[cfg(feature = "colorized_output")]
use console::style;

pub fn heading(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        style(text).bold().cyan().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

pub fn label(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        style(text).bold().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

pub fn success(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        style(text).green().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

pub fn warning(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        style(text).yellow().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}
