use rstest::rstest;
use time::macros::datetime;

use super::*;

const T0: OffsetDateTime = datetime!(2025-03-01 12:00:00 UTC);

fn policy() -> RefreshPolicy {
    RefreshPolicy {
        short: Duration::hours(48),
        long: Duration::days(7),
        backdate: true,
    }
}

fn issued(lifetime: Duration) -> CertificateLifetime {
    CertificateLifetime {
        not_before: T0,
        not_after: T0 + lifetime,
    }
}

#[rstest]
#[case::short_before_half(Duration::hours(48), Duration::hours(24) - Duration::SECOND, RefreshState::Fresh)]
#[case::short_at_half(Duration::hours(48), Duration::hours(24), RefreshState::Due)]
#[case::short_after_half(Duration::hours(48), Duration::hours(24) + Duration::SECOND, RefreshState::Due)]
#[case::long_before_half(Duration::days(7), Duration::hours(84) - Duration::SECOND, RefreshState::Fresh)]
#[case::long_after_half(Duration::days(7), Duration::hours(84) + Duration::SECOND, RefreshState::Due)]
#[case::expired(Duration::hours(48), Duration::days(30), RefreshState::Due)]
fn test_half_life_boundary(
    #[case] lifetime: Duration,
    #[case] elapsed: Duration,
    #[case] expected: RefreshState,
) {
    assert_eq!(
        policy().state(false, Some(&issued(lifetime)), T0 + elapsed),
        expected
    );
}

#[test]
fn test_half_life_capped_at_long_lifetime() {
    // backdated one year, half-life is still half the long lifetime
    let current = CertificateLifetime {
        not_before: T0 - Duration::days(365),
        not_after: T0 + Duration::days(7),
    };

    assert_eq!(policy().half_life(&current), Duration::hours(84));
    assert_eq!(
        policy().state(false, Some(&current), T0 + Duration::hours(84) - Duration::SECOND),
        RefreshState::Fresh
    );
    assert_eq!(
        policy().state(false, Some(&current), T0 + Duration::hours(84)),
        RefreshState::Due
    );
}

#[test]
fn test_state_unsigned_and_rejected() {
    assert_eq!(policy().state(false, None, T0), RefreshState::Unsigned);
    assert_eq!(policy().state(true, None, T0), RefreshState::Rejected);
    assert_eq!(
        policy().state(true, Some(&issued(Duration::hours(1))), T0 + Duration::days(1)),
        RefreshState::Rejected
    );
}

#[rstest]
#[case::short(Duration::hours(48), SigningTarget { lifetime: Duration::hours(48), backdate: false })]
#[case::long(Duration::days(7), SigningTarget { lifetime: Duration::days(7), backdate: true })]
#[case::longer_than_long(Duration::days(400), SigningTarget { lifetime: Duration::days(7), backdate: true })]
#[case::shorter_than_short(Duration::hours(1), SigningTarget { lifetime: Duration::hours(48), backdate: false })]
fn test_target(#[case] lifetime: Duration, #[case] expected: SigningTarget) {
    assert_eq!(policy().target(&issued(lifetime)), expected);
}

#[test]
fn test_manual_shortening_refused() {
    let current = issued(Duration::days(7));

    let result = policy().check_manual(Some(&current), &policy().manual_target(false), T0);

    assert!(matches!(
        result,
        Err(BusinessLogicError::LongLivedCertificateOutstanding { not_after }) if not_after == current.not_after
    ));
}

#[test]
fn test_manual_sign_allowed() {
    let policy = policy();

    assert!(policy.check_manual(None, &policy.manual_target(false), T0).is_ok());
    assert!(
        policy
            .check_manual(Some(&issued(Duration::days(7))), &policy.manual_target(true), T0)
            .is_ok()
    );
    // expired long-lived certificate no longer blocks a short one
    assert!(
        policy
            .check_manual(
                Some(&issued(Duration::days(7))),
                &policy.manual_target(false),
                T0 + Duration::days(6)
            )
            .is_ok()
    );
}

#[test]
fn test_backdate_requires_long_lifetime() {
    let target = SigningTarget {
        lifetime: Duration::hours(48),
        backdate: true,
    };

    assert!(matches!(
        policy().check_manual(None, &target, T0),
        Err(BusinessLogicError::BackdateRequiresLongLifetime)
    ));
}
