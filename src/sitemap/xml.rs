//! `urlset` document writer
//!
//! Builds the document from quick-xml events so element text and attribute
//! values are always escaped.

use super::entry::{SitemapEntry, CHANGEFREQ};
use super::language::LanguageConfig;
use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Sitemap protocol namespace
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Namespace of the `xhtml:link` alternate extension
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// hreflang value of the alternate pointing at the default language
pub const X_DEFAULT: &str = "x-default";

/// Write the complete sitemap document
///
/// One `<url>` is written per (entry, language) pair. With more than one
/// language every block also lists all alternates plus `x-default`.
pub fn write_urlset(
    entries: &[SitemapEntry],
    base_url: &str,
    languages: &[LanguageConfig],
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset")
            .with_attributes([("xmlns", SITEMAP_NS), ("xmlns:xhtml", XHTML_NS)]),
    ))?;

    let with_alternates = languages.len() > 1;

    for entry in entries {
        let alternates = if with_alternates {
            alternate_links(entry, base_url, languages)
        } else {
            Vec::new()
        };

        for language in languages {
            let loc = language.localize(base_url, &entry.loc);
            write_url(&mut writer, entry, &loc, &alternates)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| crate::SitemapError::Xml(format!("Sitemap is not valid UTF-8: {}", e)))
}

/// (hreflang, href) pairs for every language, then `x-default`
fn alternate_links(
    entry: &SitemapEntry,
    base_url: &str,
    languages: &[LanguageConfig],
) -> Vec<(String, String)> {
    let mut links: Vec<(String, String)> = languages
        .iter()
        .map(|language| (language.code.clone(), language.localize(base_url, &entry.loc)))
        .collect();

    if let Some(default) = languages.first() {
        links.push((X_DEFAULT.to_string(), default.localize(base_url, &entry.loc)));
    }
    links
}

fn write_url(
    writer: &mut Writer<Vec<u8>>,
    entry: &SitemapEntry,
    loc: &str,
    alternates: &[(String, String)],
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;

    write_text_element(writer, "loc", loc)?;
    write_text_element(writer, "lastmod", &entry.lastmod)?;
    write_text_element(writer, "changefreq", CHANGEFREQ)?;
    write_text_element(writer, "priority", &entry.priority.to_string())?;

    for (hreflang, href) in alternates {
        writer.write_event(Event::Empty(BytesStart::new("xhtml:link").with_attributes([
            ("rel", "alternate"),
            ("hreflang", hreflang.as_str()),
            ("href", href.as_str()),
        ])))?;
    }

    writer.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::entry::Priority;

    fn entry(loc: &str) -> SitemapEntry {
        SitemapEntry::new(loc, "2024-01-15", Priority::DEFAULT)
    }

    #[test]
    fn test_empty_urlset() {
        let xml = write_urlset(&[], "https://x.com/", &[LanguageConfig::default()]).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(
            r#"<urlset xmlns="{}" xmlns:xhtml="{}">"#,
            SITEMAP_NS, XHTML_NS
        )));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_child_order() {
        let xml =
            write_urlset(&[entry("/about")], "https://x.com/", &[LanguageConfig::default()]).unwrap();

        let loc = xml.find("<loc>https://x.com/about</loc>").unwrap();
        let lastmod = xml.find("<lastmod>2024-01-15</lastmod>").unwrap();
        let changefreq = xml.find("<changefreq>weekly</changefreq>").unwrap();
        let priority = xml.find("<priority>0.8</priority>").unwrap();
        let close = xml.find("</url>").unwrap();
        assert!(loc < lastmod && lastmod < changefreq && changefreq < priority && priority < close);
    }

    #[test]
    fn test_text_and_attributes_escaped() {
        let languages = [LanguageConfig::new("en", ""), LanguageConfig::new("fr", "fr")];
        let xml = write_urlset(&[entry("/q&a")], "https://x.com/", &languages).unwrap();

        assert!(xml.contains("<loc>https://x.com/q&amp;a</loc>"));
        assert!(xml.contains(r#"href="https://x.com/fr/q&amp;a""#));
        assert!(!xml.contains("q&a<"));
    }

    #[test]
    fn test_alternates_include_x_default() {
        let languages = [LanguageConfig::new("en", ""), LanguageConfig::new("de", "de")];
        let links = alternate_links(&entry("/about"), "https://x.com/", &languages);

        assert_eq!(
            links,
            vec![
                ("en".to_string(), "https://x.com/about".to_string()),
                ("de".to_string(), "https://x.com/de/about".to_string()),
                ("x-default".to_string(), "https://x.com/about".to_string()),
            ]
        );
    }
}
