use crate::models::settings::Language;

pub fn t(lang: &Language, key: &'static str) -> &'static str {
    match lang {
        Language::Chinese => zh_cn(key),
        Language::English => en_us(key),
        Language::Japanese => ja_jp(key),
    }
}

fn zh_cn(key: &'static str) -> &'static str {
    match key {
        // 服务端
        "ssh.connected" => "连接成功！",
        "ssh.closed" => "连接已关闭。",
        "gateway.session_active" => "当前连接已有活动会话",

        // 客户端
        "client.required_fields" => "主机名和用户名为必填项。",
        "client.in_progress" => "正在连接中",
        "client.socket_error" => "WebSocket 错误",
        "client.closed" => "连接已关闭。",
        "client.code" => "代码",
        "client.reason" => "原因",
        "client.error" => "错误",
        "client.quit_hint" => "按 Ctrl-] 退出。",

        _ => key,
    }
}

fn en_us(key: &'static str) -> &'static str {
    match key {
        // Server
        "ssh.connected" => "Connected!",
        "ssh.closed" => "Connection closed.",
        "gateway.session_active" => "A session is already active on this connection",

        // Client
        "client.required_fields" => "Host and username are required.",
        "client.in_progress" => "Connection already in progress",
        "client.socket_error" => "WebSocket Error",
        "client.closed" => "Connection closed.",
        "client.code" => "code",
        "client.reason" => "reason",
        "client.error" => "Error",
        "client.quit_hint" => "Press Ctrl-] to quit.",

        _ => key,
    }
}

fn ja_jp(key: &'static str) -> &'static str {
    match key {
        // サーバー
        "ssh.connected" => "接続成功！",
        "ssh.closed" => "接続が閉じられました。",
        "gateway.session_active" => "この接続では既にセッションが有効です",

        // クライアント
        "client.required_fields" => "ホスト名とユーザー名は必須です。",
        "client.in_progress" => "接続処理中です",
        "client.socket_error" => "WebSocket エラー",
        "client.closed" => "接続が閉じられました。",
        "client.code" => "コード",
        "client.reason" => "理由",
        "client.error" => "エラー",
        "client.quit_hint" => "Ctrl-] で終了します。",

        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(t(&Language::English, "ssh.connected"), "Connected!");
        assert_eq!(t(&Language::Japanese, "ssh.connected"), "接続成功！");
        assert_eq!(t(&Language::Chinese, "missing.key"), "missing.key");
    }

    #[test]
    fn test_quit_hint_names_escape_key() {
        for lang in [Language::English, Language::Chinese, Language::Japanese] {
            assert!(t(&lang, "client.quit_hint").contains("Ctrl-]"), "{:?}", lang);
        }
    }
}
