//! Template catalog: one outbound URL template per sharing channel.

use anyhow::{anyhow, Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::config::share::ShareConfig;

/// Named outbound sharing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Twitter,
    Facebook,
    Linkedin,
    Googleplus,
    Reddit,
    Pinterest,
    Url,
    Email,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::Twitter,
        Channel::Facebook,
        Channel::Linkedin,
        Channel::Googleplus,
        Channel::Reddit,
        Channel::Pinterest,
        Channel::Url,
        Channel::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Twitter => "twitter",
            Channel::Facebook => "facebook",
            Channel::Linkedin => "linkedin",
            Channel::Googleplus => "googleplus",
            Channel::Reddit => "reddit",
            Channel::Pinterest => "pinterest",
            Channel::Url => "url",
            Channel::Email => "email",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Channel::Twitter => "https://twitter.com/intent/tweet?url={{url}}&text={{title}}&related={{relatedTwitterAccounts}}&via=FT",
            Channel::Facebook => "http://www.facebook.com/sharer.php?u={{url}}&t={{title}}+|+{{titleExtra}}",
            Channel::Linkedin => "http://www.linkedin.com/shareArticle?mini=true&url={{url}}&title={{title}}+|+{{titleExtra}}&summary={{summary}}&source=Financial+Times",
            Channel::Googleplus => "https://plus.google.com/share?url={{url}}",
            Channel::Reddit => "http://reddit.com/submit?url={{url}}&title={{title}}",
            Channel::Pinterest => "http://www.pinterest.com/pin/create/button/?url={{url}}&description={{title}}",
            Channel::Url => "{{url}}",
            Channel::Email => "mailto:?subject=See this article on FT.com&body={{title}}%0A{{url}}",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| anyhow!("unknown share channel '{}'", s))
    }
}

/// Values substituted into a channel template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub short_url: &'a str,
    pub title: &'a str,
    pub title_extra: &'a str,
    pub summary: &'a str,
    pub related_twitter_accounts: &'a str,
}

impl<'a> TemplateValues<'a> {
    pub fn new(short_url: &'a str, config: &'a ShareConfig) -> Self {
        Self {
            short_url,
            title: &config.title,
            title_extra: &config.title_extra,
            summary: &config.summary,
            related_twitter_accounts: &config.related_twitter_accounts,
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([a-zA-Z]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Fill `{{url}}` with the short link as is and every other known placeholder
/// with its URL-encoded value. Unknown placeholders are left untouched.
pub fn render_template(template: &str, values: &TemplateValues<'_>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures| {
            let value = match &caps[1] {
                "url" => return values.short_url.to_owned(),
                "title" => values.title,
                "titleExtra" => values.title_extra,
                "summary" => values.summary,
                "relatedTwitterAccounts" => values.related_twitter_accounts,
                _ => return caps[0].to_owned(),
            };
            urlencoding::encode(value).into_owned()
        })
        .into_owned()
}

/// Render `channel`'s template for a resolved short link.
pub fn render_channel(channel: Channel, short_url: &str, config: &ShareConfig) -> String {
    render_template(channel.template(), &TemplateValues::new(short_url, config))
}
