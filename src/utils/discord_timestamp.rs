use time::OffsetDateTime;

/// Rendering style of Discord `<t:...>` timestamp markup.
#[derive(Clone, Copy, Debug)]
pub enum TimestampStyle {
    /// e.g. `20 April 2021 16:20`
    ShortDateTime,
    /// e.g. `2 minutes ago`
    Relative,
}

impl TimestampStyle {
    fn suffix(self) -> char {
        match self {
            TimestampStyle::ShortDateTime => 'f',
            TimestampStyle::Relative => 'R',
        }
    }
}

/// Markup that Discord clients render as a date/time in the reader's locale.
pub fn discord_timestamp(datetime: OffsetDateTime, style: TimestampStyle) -> String {
    format!("<t:{}:{}>", datetime.unix_timestamp(), style.suffix())
}
