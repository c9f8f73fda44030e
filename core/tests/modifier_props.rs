use game_core::{
    resources::{ResourceModifierComponent, HEALTH},
    EcsResource, EntityRegistry, FnModifier,
};
use proptest::prelude::*;

proptest! {
    /// 모디파이어가 없으면 입력값이 그대로 나온다.
    #[test]
    fn no_modifier_is_identity(base in any::<i32>(), name in "[A-Z_]{1,12}") {
        let mut registry = EntityRegistry::new();
        let id = registry.create();
        let component = ResourceModifierComponent::new();
        let view = registry.view(id).unwrap();

        prop_assert_eq!(component.get_resource(view, &EcsResource::new(name), base), base);
    }

    /// 우선순위가 고정되어 있으면 등록 순서와 무관하게 같은 결과가 나온다.
    #[test]
    fn priority_fixes_result(
        base in -1000i32..1000,
        add_priority in -5i32..5,
        mul_priority in -5i32..5,
        add_first in any::<bool>(),
    ) {
        prop_assume!(add_priority != mul_priority);
        let mut registry = EntityRegistry::new();
        let id = registry.create();

        let build = |add_first: bool| {
            let mut component = ResourceModifierComponent::new();
            let add = || Box::new(FnModifier::flat(add_priority, 3));
            let mul = || Box::new(FnModifier::new(mul_priority, |_, v| Ok(v * 2)));
            if add_first {
                component.add_modifier(HEALTH, add());
                component.add_modifier(HEALTH, mul());
            } else {
                component.add_modifier(HEALTH, mul());
                component.add_modifier(HEALTH, add());
            }
            component
        };

        let expected = if add_priority < mul_priority { (base + 3) * 2 } else { base * 2 + 3 };
        let view = registry.view(id).unwrap();
        prop_assert_eq!(build(add_first).get_resource(view, &HEALTH, base), expected);
        prop_assert_eq!(build(!add_first).get_resource(view, &HEALTH, base), expected);
    }
}
