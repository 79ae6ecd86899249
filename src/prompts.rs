use crate::error::ErrorKind;

pub const DEFAULT_SYSTEM_CONTENT: &str = include_str!("../data/prompts/system_content.txt");

/// Language used for user-facing replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    ZhCn,
    EnUs,
}

impl Locale {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zh" | "zh-cn" => Some(Locale::ZhCn),
            "en" | "en-us" => Some(Locale::EnUs),
            _ => None,
        }
    }
}

/// Fixed user-facing texts for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub expect_input: &'static str,
    pub too_many_images: &'static str,
    pub unsupported_file_type: &'static str,
    pub file_too_large: &'static str,
    pub download_error: &'static str,
    pub upstream_error: &'static str,
    pub voice_error: &'static str,
}

const ZH_CN: Messages = Messages {
    expect_input: "请输入您想与 GPT 聊天的内容。",
    too_many_images: "一次只能发送一张图片。",
    unsupported_file_type: "不支持的图片格式，仅支持 JPEG、PNG 和 GIF。",
    file_too_large: "图片太大了，请发送 10MB 以内的图片。",
    download_error: "图片下载失败，请稍后再试。",
    upstream_error: "调用 OpenAI API 时出错，请稍后再试。",
    voice_error: "语音合成失败。",
};

const EN_US: Messages = Messages {
    expect_input: "Please enter what you would like to chat with GPT about.",
    too_many_images: "Only one image can be sent at a time.",
    unsupported_file_type: "Unsupported image type. Only JPEG, PNG and GIF are accepted.",
    file_too_large: "The image is too large. Please send an image under 10 MB.",
    download_error: "Failed to download the image, please try again later.",
    upstream_error: "Error calling the OpenAI API, please try again later.",
    voice_error: "Voice synthesis failed.",
};

impl Messages {
    pub fn for_locale(locale: Locale) -> &'static Messages {
        match locale {
            Locale::ZhCn => &ZH_CN,
            Locale::EnUs => &EN_US,
        }
    }

    /// User-facing text for a classified failure. Unclassified failures get
    /// the generic download message since they can only surface while
    /// resolving the image.
    pub fn for_error(&self, kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::MultipleImages => self.too_many_images,
            ErrorKind::UnsupportedType => self.unsupported_file_type,
            ErrorKind::TooLarge => self.file_too_large,
            ErrorKind::UpstreamModelError => self.upstream_error,
            ErrorKind::VoiceSynthesisError => self.voice_error,
            ErrorKind::TransportFailure | ErrorKind::ExhaustedRetries | ErrorKind::Internal => {
                self.download_error
            }
        }
    }
}
