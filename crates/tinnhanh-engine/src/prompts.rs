//! Prompt text sent to the model. All prompts are Vietnamese; the model
//! writes in the language it is addressed in.

use tinnhanh_core::article::{ArticleConfig, GeneratedArticle, Length, RewriteLength, Topic};

const NO_LEAD: &str = "KHÔNG VIẾT SA-PÔ (TÓM TẮT): chỉ tạo Tiêu đề và đi thẳng vào Nội dung.";

/// Time and date rules shared by every prompt.
pub const TIME_RULES: &str = "QUY TẮC VIẾT THỜI GIAN (BẮT BUỘC):
- Giờ: định dạng HHhMM' (ví dụ: 07h15', 19h00', 00h01').
- Ngày: định dạng DD/MM/YYYY.
- Các tháng từ 3 đến 9 KHÔNG viết số 0 ở trước (ví dụ: 12/3/2026, 05/9/2026).
- Các tháng 1, 2, 10, 11, 12 giữ số 0 nếu cần (ví dụ: 05/01/2026, 31/12/2025).";

const REFINE_RULES: &str = "Nhiệm vụ: chuẩn hóa dữ liệu thô báo chí.
YÊU CẦU NGHIÊM NGẶT:
- KHÔNG tự ý thêm thông tin mới.
- KHÔNG viết thành bài báo hoàn chỉnh.
- CHỈ chỉnh sửa: chính tả, viết hoa tên riêng và địa danh, định dạng thời gian.
- Trình bày lại cho rõ ràng, mạch lạc, dễ đọc nhưng vẫn giữ nguyên tính chất dữ liệu thô.
- Chỉ trả về văn bản đã chuẩn hóa, không giải thích.";

const INCIDENT_STRUCTURE: &str = "CẤU TRÚC VỤ VIỆC (QUY TẮC NGHIÊM NGẶT):
1. KHÔNG SUY DIỄN: tuyệt đối không thêm chi tiết không có trong dữ liệu gốc.
2. DÒNG THỜI GIAN: thời điểm -> diễn biến -> tiếp nhận tin báo -> điều tra -> kết quả.
PHONG CÁCH: tin an ninh trật tự, khách quan.";

const CONFERENCE_STRUCTURE: &str = "CẤU TRÚC HỘI NGHỊ/HOẠT ĐỘNG:
1. Tiêu đề: [Đơn vị] + [Hội nghị/Hoạt động].
2. Mở đầu: thời gian, địa điểm, thành phần đại biểu.
3. Nội dung: các báo cáo, con số, tình hình công tác.
4. Kết luận và khen thưởng: ý kiến chỉ đạo, danh sách khen thưởng.";

const KEEP_FACTS: &str = "Giữ nguyên các thông tin thực tế, tên riêng và địa danh.";

/// System instruction for the refine step.
pub fn refine_instruction() -> String {
    format!("{REFINE_RULES}\n\n{TIME_RULES}")
}

pub fn refine_prompt(text: &str) -> String {
    format!("Văn bản cần xử lý:\n\"\"\"\n{text}\n\"\"\"")
}

pub fn length_guidance(length: Length) -> &'static str {
    match length {
        Length::Short => "ngắn gọn, tập trung thông tin (khoảng 200 từ)",
        Length::Medium => "đầy đủ, mạch lạc (khoảng 400-500 từ)",
        Length::Long => "chi tiết, phân tích kỹ (khoảng 800 từ)",
    }
}

/// Structure section for `topic`. A blank custom template falls back to
/// the incident structure.
pub fn topic_structure(topic: Topic, config: &ArticleConfig) -> String {
    match topic {
        Topic::Conference => CONFERENCE_STRUCTURE.to_string(),
        Topic::Incident => INCIDENT_STRUCTURE.to_string(),
        Topic::Other => match config.template() {
            Some(template) => format!("DỰA TRÊN MẪU YÊU CẦU:\n{template}"),
            None => format!("SỬ DỤNG CẤU TRÚC VỤ VIỆC:\n{INCIDENT_STRUCTURE}"),
        },
    }
}

/// Name handling: dotted initials for each flagged role, full names otherwise.
pub fn redaction_rules(config: &ArticleConfig) -> String {
    let victim = if config.abbreviate_victim {
        "- Viết tắt tên NẠN NHÂN thành chữ cái đầu có dấu chấm (vd: 'Phạm Văn D' -> 'P.V.D')."
    } else {
        "- Giữ nguyên tên đầy đủ của nạn nhân."
    };
    let subject = if config.abbreviate_subject {
        "- Viết tắt tên ĐỐI TƯỢNG thành chữ cái đầu có dấu chấm (vd: 'Nguyễn Thế Anh' -> 'N.T.A')."
    } else {
        "- Giữ nguyên tên đầy đủ của đối tượng."
    };
    format!("{victim}\n{subject}")
}

pub fn synthesis_instruction() -> String {
    format!(
        "Bạn là biên tập viên báo chí chuyên nghiệp.\n{NO_LEAD}\n\
         Trả về JSON gồm `title` (tiêu đề), `content` (nội dung bài viết) và `tags` (từ khóa)."
    )
}

pub fn synthesis_prompt(
    topic: Topic,
    length: Length,
    brief: &str,
    config: &ArticleConfig,
) -> String {
    format!(
        "Viết bài báo dựa trên dữ liệu sau.
Chủ đề: {topic_label}
Độ dài: {length_label}, {length}

Dữ liệu:
\"\"\"
{brief}
\"\"\"

QUY TẮC CHUNG:
- {NO_LEAD}
{TIME_RULES}

QUY TẮC VỀ TÊN NGƯỜI:
{redaction}

{structure}",
        topic_label = topic.label(),
        length_label = length.label(),
        length = length_guidance(length),
        brief = brief.trim(),
        redaction = redaction_rules(config),
        structure = topic_structure(topic, config),
    )
}

pub fn rewrite_directive(target: RewriteLength) -> &'static str {
    match target {
        RewriteLength::Shorter => {
            "viết ngắn gọn lại, súc tích hơn, chỉ giữ lại các thông tin cốt lõi nhất"
        }
        RewriteLength::Equivalent => {
            "giữ độ dài tương đương nhưng diễn đạt khác đi, trôi chảy hơn"
        }
        RewriteLength::Longer => {
            "viết dài hơn, chi tiết hơn, mở rộng tình tiết và bối cảnh nếu phù hợp"
        }
    }
}

pub fn rewrite_instruction() -> String {
    format!(
        "Bạn là biên tập viên báo chí cao cấp.\n{NO_LEAD}\n{KEEP_FACTS}\n\
         Trả về JSON gồm `title`, `content` và có thể kèm `tags`."
    )
}

pub fn rewrite_prompt(
    current: &GeneratedArticle,
    target: RewriteLength,
    custom_instruction: Option<&str>,
) -> String {
    let extra = custom_instruction
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            format!(
                "\nYÊU CẦU BỔ SUNG TỪ NGƯỜI DÙNG: \"{s}\". Hãy ưu tiên thực hiện yêu cầu này \
                 trong khi vẫn đảm bảo cấu trúc bài báo.\n"
            )
        })
        .unwrap_or_default();

    format!(
        "Hãy viết lại bài báo sau đây.
YÊU CẦU VỀ ĐỘ DÀI: {directive}.
{extra}
Bài hiện tại:
Tiêu đề: {title}
Nội dung:
{content}

QUY TẮC BẮT BUỘC:
- {NO_LEAD}
- {KEEP_FACTS}
{TIME_RULES}",
        directive = rewrite_directive(target),
        title = current.title.trim(),
        content = current.content.trim(),
    )
}
