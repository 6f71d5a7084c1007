/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: token 検証 / 認可, http/cors/security_headers: 横断的関心事
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
