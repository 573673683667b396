use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// 签名固定覆盖的请求头
const SIGNED_HEADERS: &str = "content-type;host;x-amz-date;x-amz-target";

pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub host: &'a str,
    /// `YYYYMMDDTHHMMSSZ`
    pub amz_date: &'a str,
    pub amz_target: &'a str,
    pub content_type: &'a str,
    pub payload: &'a str,
}

pub fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn hmac_sha256(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// SigV4规范请求。请求目标固定为`POST /`，查询串为空。
pub fn canonical_request(params: &SigningParams) -> String {
    format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\nx-amz-date:{}\nx-amz-target:{}\n\n{}\n{}",
        params.content_type,
        params.host,
        params.amz_date,
        params.amz_target,
        SIGNED_HEADERS,
        sha256_hex(params.payload),
    )
}

/// 计算`Authorization`头
pub fn authorization_header(params: &SigningParams) -> String {
    let date = &params.amz_date[..8];
    let scope = format!(
        "{}/{}/{}/aws4_request",
        date, params.region, params.service
    );
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        params.amz_date,
        scope,
        sha256_hex(&canonical_request(params)),
    );

    // 逐级派生签名密钥
    let k_date = hmac_sha256(
        format!("AWS4{}", params.secret_access_key).as_bytes(),
        date,
    );
    let k_region = hmac_sha256(&k_date, params.region);
    let k_service = hmac_sha256(&k_region, params.service);
    let k_signing = hmac_sha256(&k_service, "aws4_request");
    let signature = hex::encode(hmac_sha256(&k_signing, &string_to_sign));

    format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        params.access_key_id, scope, SIGNED_HEADERS, signature
    )
}
