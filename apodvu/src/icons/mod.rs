use horrorshow::{owned_html, Raw, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon
{
    Calendar,
    Check,
    Hourglass,
    Images,
    Info,
    Key,
    Search,
    Telescope,
    Warning,
}

#[derive(Debug, Clone, Copy)]
pub enum IconSize
{
    Size16x16,
    Size32x32,
}

impl Icon
{
    fn entity(&self) -> &'static str
    {
        match self
        {
            Icon::Calendar => "&#x1F4C5;",
            Icon::Check => "&#x2705;",
            Icon::Hourglass => "&#x23F3;",
            Icon::Images => "&#x1F5BC;",
            Icon::Info => "&#x2139;",
            Icon::Key => "&#x1F511;",
            Icon::Search => "&#x1F50D;",
            Icon::Telescope => "&#x1F52D;",
            Icon::Warning => "&#x26A0;",
        }
    }

    pub fn render(&self, size: IconSize) -> Raw<String>
    {
        let size = match size
        {
            IconSize::Size16x16 => 16,
            IconSize::Size32x32 => 32,
        };

        let entity = self.entity();

        let html = owned_html!
        {
            span(class=format!("icon icon-{}", size), aria-hidden="true")
            {
                : Raw(entity)
            }
        }.into_string().unwrap();

        Raw(html)
    }
}
