// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Machine-readable tags for every check the validation processes perform.
//!
//! Each tag has a stable code (used on the wire), the question the check asks and the
//! message recorded when the answer is negative.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageTag {
    // Identification of the signing certificate
    BbbIcsIsci,
    BbbIcsIsascp,
    BbbIcsIcdvv,
    BbbIcsAidnasne,

    // Validation context initialisation
    BbbVciIspk,
    BbbVciIsphv,

    // Cryptographic verification
    BbbCvIrdof,
    BbbCvIrdoi,
    BbbCvIsi,

    // Signature acceptance validation
    BbbSavIsqpstp,
    BbbSavIsqpctp,
    BbbSavAsccm,
    BbbSavAsar,

    // X.509 certificate validation
    BbbXcvCccbb,
    BbbXcvIcsi,
    BbbXcvIrdpfc,
    BbbXcvIrif,
    BbbXcvIscr,
    BbbXcvIscoh,
    BbbXcvIctivrsc,
    BbbXcvIicr,
    BbbXcvIctivrca,
    BbbXcvAcccm,
    BbbXcvAccar,

    // Basic validation
    BsvIctsv,
    BsvIarctst,
    BsvIscnrbct,
    BsvIscnebct,
    BsvIfbbbr,

    // AdES-T validation
    AdestRobvpiic,
    AdestImidf,
    AdestImivc,
    AdestItvpc,
    AdestIstptdabst,
    AdestItsp,
    AdestIvtsp,
    AdestIrtpbst,
    AdestIbstaidsc,
    AdestIbstbedsc,
    AdestIscvebst,
    AdestIarbst,
    AdestIctsbst,
    AdestIstbvdt,
    AdestIstbat,
    AdestIvdtbat,
    AdestIcstp,
    AdestIstwd,
    AdestBstr,

    // Long-term validation
    LtvAbsv,
    LtvItspoe,

    // Past certificate validation and control time sliding
    PcvIccbta,
    PcvIvrie,
    PcvIcsi,
    CtsDrie,
    CtsIriiwcv,
    CtsIriibct,
    CtsDpoebct,
    CtsDrpoebct,

    // Past signature validation
    PsvIpcvc,
    PsvIpsvc,
    PsvIpoebrt,
    PsvIpoeaid,
    PsvIpoebed,
    PsvIscvect,
    PsvIpoear,
    PsvCtr,
}

impl MessageTag {
    pub const ALL: &'static [MessageTag] = &[
        MessageTag::BbbIcsIsci,
        MessageTag::BbbIcsIsascp,
        MessageTag::BbbIcsIcdvv,
        MessageTag::BbbIcsAidnasne,
        MessageTag::BbbVciIspk,
        MessageTag::BbbVciIsphv,
        MessageTag::BbbCvIrdof,
        MessageTag::BbbCvIrdoi,
        MessageTag::BbbCvIsi,
        MessageTag::BbbSavIsqpstp,
        MessageTag::BbbSavIsqpctp,
        MessageTag::BbbSavAsccm,
        MessageTag::BbbSavAsar,
        MessageTag::BbbXcvCccbb,
        MessageTag::BbbXcvIcsi,
        MessageTag::BbbXcvIrdpfc,
        MessageTag::BbbXcvIrif,
        MessageTag::BbbXcvIscr,
        MessageTag::BbbXcvIscoh,
        MessageTag::BbbXcvIctivrsc,
        MessageTag::BbbXcvIicr,
        MessageTag::BbbXcvIctivrca,
        MessageTag::BbbXcvAcccm,
        MessageTag::BbbXcvAccar,
        MessageTag::BsvIctsv,
        MessageTag::BsvIarctst,
        MessageTag::BsvIscnrbct,
        MessageTag::BsvIscnebct,
        MessageTag::BsvIfbbbr,
        MessageTag::AdestRobvpiic,
        MessageTag::AdestImidf,
        MessageTag::AdestImivc,
        MessageTag::AdestItvpc,
        MessageTag::AdestIstptdabst,
        MessageTag::AdestItsp,
        MessageTag::AdestIvtsp,
        MessageTag::AdestIrtpbst,
        MessageTag::AdestIbstaidsc,
        MessageTag::AdestIbstbedsc,
        MessageTag::AdestIscvebst,
        MessageTag::AdestIarbst,
        MessageTag::AdestIctsbst,
        MessageTag::AdestIstbvdt,
        MessageTag::AdestIstbat,
        MessageTag::AdestIvdtbat,
        MessageTag::AdestIcstp,
        MessageTag::AdestIstwd,
        MessageTag::AdestBstr,
        MessageTag::LtvAbsv,
        MessageTag::LtvItspoe,
        MessageTag::PcvIccbta,
        MessageTag::PcvIvrie,
        MessageTag::PcvIcsi,
        MessageTag::CtsDrie,
        MessageTag::CtsIriiwcv,
        MessageTag::CtsIriibct,
        MessageTag::CtsDpoebct,
        MessageTag::CtsDrpoebct,
        MessageTag::PsvIpcvc,
        MessageTag::PsvIpsvc,
        MessageTag::PsvIpoebrt,
        MessageTag::PsvIpoeaid,
        MessageTag::PsvIpoebed,
        MessageTag::PsvIscvect,
        MessageTag::PsvIpoear,
        MessageTag::PsvCtr,
    ];

    /// `(code, question, negative answer)`.
    fn describe(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            MessageTag::BbbIcsIsci => (
                "BBB_ICS_ISCI",
                "Is there an identified candidate for the signing certificate?",
                "There is no candidate for the signing certificate.",
            ),
            MessageTag::BbbIcsIsascp => (
                "BBB_ICS_ISASCP",
                "Is the signed attribute: 'signing-certificate' present?",
                "The signed attribute: 'signing-certificate' is absent.",
            ),
            MessageTag::BbbIcsIcdvv => (
                "BBB_ICS_ICDVV",
                "Is the certificate's digest value valid?",
                "The digest of the signing certificate does not match the signed reference.",
            ),
            MessageTag::BbbIcsAidnasne => (
                "BBB_ICS_AIDNASNE",
                "Are the issuer distinguished name and the serial number equal?",
                "The issuer distinguished name and serial number do not match the signing certificate.",
            ),
            MessageTag::BbbVciIspk => (
                "BBB_VCI_ISPK",
                "Is the signature policy known?",
                "The signature policy is not identified.",
            ),
            MessageTag::BbbVciIsphv => (
                "BBB_VCI_ISPHV",
                "Is the signature policy hash valid?",
                "The hash of the signature policy does not match.",
            ),
            MessageTag::BbbCvIrdof => (
                "BBB_CV_IRDOF",
                "Has the reference data object been found?",
                "The reference data object is not found.",
            ),
            MessageTag::BbbCvIrdoi => (
                "BBB_CV_IRDOI",
                "Is the reference data object intact?",
                "The reference data object is not intact.",
            ),
            MessageTag::BbbCvIsi => (
                "BBB_CV_ISI",
                "Is the signature intact?",
                "The signature is not intact.",
            ),
            MessageTag::BbbSavIsqpstp => (
                "BBB_SAV_ISQPSTP",
                "Is signed qualifying property: 'signing-time' present?",
                "The signed qualifying property: 'signing-time' is absent.",
            ),
            MessageTag::BbbSavIsqpctp => (
                "BBB_SAV_ISQPCTP",
                "Is signed qualifying property: 'content-type' present?",
                "The signed qualifying property: 'content-type' is absent.",
            ),
            MessageTag::BbbSavAsccm => (
                "BBB_SAV_ASCCM",
                "Are signature cryptographic constraints met?",
                "The signature cryptographic constraints are not met.",
            ),
            MessageTag::BbbSavAsar => (
                "BBB_SAV_ASAR",
                "Are the signature algorithms reliable at the validation time?",
                "The signature algorithms are no longer considered reliable.",
            ),
            MessageTag::BbbXcvCccbb => (
                "BBB_XCV_CCCBB",
                "Can the certificate chain be built till the trust anchor?",
                "The certificate chain is not built till a trust anchor.",
            ),
            MessageTag::BbbXcvIcsi => (
                "BBB_XCV_ICSI",
                "Are the certificate signatures intact?",
                "The signature of a certificate in the chain is not intact.",
            ),
            MessageTag::BbbXcvIrdpfc => (
                "BBB_XCV_IRDPFC",
                "Is the revocation data present for the certificate?",
                "No revocation data is available for the certificate.",
            ),
            MessageTag::BbbXcvIrif => (
                "BBB_XCV_IRIF",
                "Is the revocation information fresh for the certificate?",
                "The revocation information is not considered fresh.",
            ),
            MessageTag::BbbXcvIscr => (
                "BBB_XCV_ISCR",
                "Is the certificate not revoked?",
                "The certificate is revoked.",
            ),
            MessageTag::BbbXcvIscoh => (
                "BBB_XCV_ISCOH",
                "Is the certificate not on hold?",
                "The certificate is on hold.",
            ),
            MessageTag::BbbXcvIctivrsc => (
                "BBB_XCV_ICTIVRSC",
                "Is the current time in the validity range of the signer's certificate?",
                "The current time is not in the validity range of the signer's certificate.",
            ),
            MessageTag::BbbXcvIicr => (
                "BBB_XCV_IICR",
                "Are the intermediate CA certificates not revoked?",
                "An intermediate CA certificate is revoked.",
            ),
            MessageTag::BbbXcvIctivrca => (
                "BBB_XCV_ICTIVRCA",
                "Is the current time in the validity range of the intermediate CA certificates?",
                "The current time is not in the validity range of an intermediate CA certificate.",
            ),
            MessageTag::BbbXcvAcccm => (
                "BBB_XCV_ACCCM",
                "Are chain cryptographic constraints met?",
                "The chain cryptographic constraints are not met.",
            ),
            MessageTag::BbbXcvAccar => (
                "BBB_XCV_ACCAR",
                "Are the chain algorithms reliable at the validation time?",
                "An algorithm used in the certificate chain is no longer considered reliable.",
            ),
            MessageTag::BsvIctsv => (
                "BSV_ICTSV",
                "Is the content timestamp validation conclusive?",
                "No content timestamp establishes a best-signature-time.",
            ),
            MessageTag::BsvIarctst => (
                "BSV_IARCTST",
                "Is the algorithm reliable at the content timestamp generation time?",
                "The algorithm was no longer reliable at the content timestamp generation time.",
            ),
            MessageTag::BsvIscnrbct => (
                "BSV_ISCNRBCT",
                "Is the signing certificate not revoked at the content timestamp generation time?",
                "The signing certificate was revoked before the content timestamp generation time.",
            ),
            MessageTag::BsvIscnebct => (
                "BSV_ISCNEBCT",
                "Is the signing certificate not expired at the content timestamp generation time?",
                "The signing certificate expired before the content timestamp generation time.",
            ),
            MessageTag::BsvIfbbbr => (
                "BSV_IFBBBR",
                "Is the result of the Basic Building Block conclusive?",
                "The result of the Basic Building Block is not conclusive.",
            ),
            MessageTag::AdestRobvpiic => (
                "ADEST_ROBVPIIC",
                "Is the result of the Basic Validation Process acceptable?",
                "The result of the Basic Validation Process is not acceptable to continue the process.",
            ),
            MessageTag::AdestImidf => (
                "ADEST_IMIDF",
                "Is the message imprint data found?",
                "The message imprint data is not found.",
            ),
            MessageTag::AdestImivc => (
                "ADEST_IMIVC",
                "Is the message imprint verification conclusive?",
                "The message imprint is not intact.",
            ),
            MessageTag::AdestItvpc => (
                "ADEST_ITVPC",
                "Is the timestamp validation process conclusive?",
                "The timestamp validation process is not conclusive.",
            ),
            MessageTag::AdestIstptdabst => (
                "ADEST_ISTPTDABST",
                "Is the timestamp production time before the best-signature-time?",
                "The timestamp production time is not before the best-signature-time.",
            ),
            MessageTag::AdestItsp => (
                "ADEST_ITSP",
                "Is a timestamp present?",
                "No timestamp is present.",
            ),
            MessageTag::AdestIvtsp => (
                "ADEST_IVTSP",
                "Is an acceptable timestamp present?",
                "No acceptable timestamp is present.",
            ),
            MessageTag::AdestIrtpbst => (
                "ADEST_IRTPBST",
                "Is the best-signature-time before the revocation time of the signing certificate?",
                "The best-signature-time is not before the revocation time of the signing certificate.",
            ),
            MessageTag::AdestIbstaidsc => (
                "ADEST_IBSTAIDSC",
                "Is the best-signature-time after the issuance date of the signing certificate?",
                "The best-signature-time is before the issuance date of the signing certificate.",
            ),
            MessageTag::AdestIbstbedsc => (
                "ADEST_IBSTBEDSC",
                "Is the best-signature-time before the expiration date of the signing certificate?",
                "The best-signature-time is after the expiration date of the signing certificate.",
            ),
            MessageTag::AdestIscvebst => (
                "ADEST_ISCVEBST",
                "Is the validity of the signing certificate established at the best-signature-time?",
                "The status of the signing certificate at the best-signature-time requires a proof of existence.",
            ),
            MessageTag::AdestIarbst => (
                "ADEST_IARBST",
                "Is the algorithm reliable at the best-signature-time?",
                "The algorithm was no longer reliable at the best-signature-time.",
            ),
            MessageTag::AdestIctsbst => (
                "ADEST_ICTSBST",
                "Are the content timestamps before the signature timestamps?",
                "A content timestamp is not before the signature timestamps.",
            ),
            MessageTag::AdestIstbvdt => (
                "ADEST_ISTBVDT",
                "Are the signature timestamps before the validation data timestamps?",
                "A signature timestamp is not before the validation data timestamps.",
            ),
            MessageTag::AdestIstbat => (
                "ADEST_ISTBAT",
                "Are the signature timestamps before the archive timestamps?",
                "A signature timestamp is not before the archive timestamps.",
            ),
            MessageTag::AdestIvdtbat => (
                "ADEST_IVDTBAT",
                "Are the validation data timestamps before the archive timestamps?",
                "A validation data timestamp is not before the archive timestamps.",
            ),
            MessageTag::AdestIcstp => (
                "ADEST_ICSTP",
                "Is the claimed signing time present?",
                "The claimed signing time is absent.",
            ),
            MessageTag::AdestIstwd => (
                "ADEST_ISTWD",
                "Is the claimed signing time within the accepted delay of the best-signature-time?",
                "The best-signature-time exceeds the accepted delay after the claimed signing time.",
            ),
            MessageTag::AdestBstr => (
                "ADEST_BSTR",
                "What is the best-signature-time?",
                "The best-signature-time has been established.",
            ),
            MessageTag::LtvAbsv => (
                "LTV_ABSV",
                "Is the result of the AdES-T validation acceptable?",
                "The result of the AdES-T validation cannot be resolved by a proof of existence.",
            ),
            MessageTag::LtvItspoe => (
                "LTV_ITSPOE",
                "Is the timestamp usable as a proof of existence?",
                "The timestamp is not usable as a proof of existence.",
            ),
            MessageTag::PcvIccbta => (
                "PCV_ICCBTA",
                "Does the certificate chain end in a trust anchor?",
                "The certificate chain does not end in a trust anchor.",
            ),
            MessageTag::PcvIvrie => (
                "PCV_IVRIE",
                "Do the validity ranges of the chain certificates intersect?",
                "The validity ranges of the chain certificates do not intersect.",
            ),
            MessageTag::PcvIcsi => (
                "PCV_ICSI",
                "Are the chain certificate signatures intact?",
                "The signature of a chain certificate is not intact.",
            ),
            MessageTag::CtsDrie => (
                "CTS_DRIE",
                "Does the revocation information exist for the certificate?",
                "No revocation information exists for the certificate.",
            ),
            MessageTag::CtsIriiwcv => (
                "CTS_IRIIWCV",
                "Is the revocation information issued within the certificate validity range?",
                "The revocation information is not issued within the certificate validity range.",
            ),
            MessageTag::CtsIriibct => (
                "CTS_IRIIBCT",
                "Is the revocation information issued before the control time?",
                "The revocation information is not issued before the control time.",
            ),
            MessageTag::CtsDpoebct => (
                "CTS_DPOEBCT",
                "Does a proof of existence of the certificate exist before the control time?",
                "No proof of existence of the certificate exists before the control time.",
            ),
            MessageTag::CtsDrpoebct => (
                "CTS_DRPOEBCT",
                "Does a proof of existence of the revocation data exist before the control time?",
                "No proof of existence of the revocation data exists before the control time.",
            ),
            MessageTag::PsvIpcvc => (
                "PSV_IPCVC",
                "Is the past certificate validation conclusive?",
                "The past certificate validation is not conclusive.",
            ),
            MessageTag::PsvIpsvc => (
                "PSV_IPSVC",
                "Does a proof of existence of the signature exist before the control time?",
                "No proof of existence of the signature exists before the control time.",
            ),
            MessageTag::PsvIpoebrt => (
                "PSV_IPOEBRT",
                "Is the proof of existence before the revocation time?",
                "The proof of existence is not before the revocation time.",
            ),
            MessageTag::PsvIpoeaid => (
                "PSV_IPOEAID",
                "Is the proof of existence after the issuance date of the certificate?",
                "The proof of existence is before the issuance date of the certificate.",
            ),
            MessageTag::PsvIpoebed => (
                "PSV_IPOEBED",
                "Is the proof of existence before the expiration date of the certificate?",
                "The proof of existence is after the expiration date of the certificate.",
            ),
            MessageTag::PsvIscvect => (
                "PSV_ISCVECT",
                "Is the validity of the certificate established at the control time?",
                "The validity of the certificate is not established at the control time.",
            ),
            MessageTag::PsvIpoear => (
                "PSV_IPOEAR",
                "Is the algorithm reliable at the proof of existence time?",
                "The algorithm was no longer reliable at the proof of existence time.",
            ),
            MessageTag::PsvCtr => (
                "PSV_CTR",
                "What is the control time?",
                "The control time has been established.",
            ),
        }
    }

    pub fn code(&self) -> &'static str {
        self.describe().0
    }

    pub fn question(&self) -> &'static str {
        self.describe().1
    }

    pub fn answer(&self) -> &'static str {
        self.describe().2
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for MessageTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for MessageTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        MessageTag::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown message tag: {code}")))
    }
}
