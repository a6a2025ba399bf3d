// HTML → markdown transforms via spider_transformations.

use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};

/// Extract the readable article body as markdown.
pub(crate) fn content_markdown(html: &[u8], url: Option<&str>) -> String {
    transform(html, url, true)
}

/// Convert the full page to markdown, no readability pruning. Used as the
/// wider net when extraction leaves almost nothing behind.
pub(crate) fn page_markdown(html: &[u8], url: Option<&str>) -> String {
    transform(html, url, false)
}

fn transform(html: &[u8], url: Option<&str>, readability: bool) -> String {
    let parsed_url = url.and_then(|u| url::Url::parse(u).ok());
    let config = TransformConfig {
        readability,
        main_content: readability,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html,
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}
